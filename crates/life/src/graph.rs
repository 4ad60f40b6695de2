//! The lazy operator graph: arithmetic, comparison and selection nodes
//! over layer sources, evaluated tile-by-tile by `eval.rs`.
//!
//! Grounded on `yirgacheffe.operators` usage throughout
//! `persistence/__init__.py::_calculate`,
//! `prepare_layers/make_current_map.py` (`isin`, `where`, `floor`,
//! `astype`) and `deltap/delta_p_scaled.py` (`numpy_apply`).

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::geo::{Area, HasExtent, PixelScale};
use crate::layer::{DataType, Layer, LayerSource};

/// A leaf layer, shared across the graph and mutably borrowed only when
/// its window is adjusted by `crate::eval::resolve`.
pub type SharedLayer = Rc<RefCell<LayerSource>>;

/// A node in the lazy operator graph. Every node knows its own
/// geographic area/scale (inherited from its inputs) and can be read
/// tile-by-tile without ever materializing the whole raster, mirroring
/// `yirgacheffe`'s calculated layers.
#[derive(Clone)]
pub enum Node {
    Leaf(SharedLayer),
    AddScalar(Box<Node>, f64),
    SubScalar(Box<Node>, f64),
    MulScalar(Box<Node>, f64),
    DivScalar(Box<Node>, f64),
    Add(Box<Node>, Box<Node>),
    Sub(Box<Node>, Box<Node>),
    Mul(Box<Node>, Box<Node>),
    Div(Box<Node>, Box<Node>),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Eq(Box<Node>, f64),
    Ne(Box<Node>, f64),
    Ge(Box<Node>, f64),
    Le(Box<Node>, f64),
    IsIn(Box<Node>, Rc<[f64]>),
    Where(Box<Node>, Box<Node>, Box<Node>),
    NanToNum(Box<Node>, f64),
    Floor(Box<Node>),
    Pow(Box<Node>, f64),
    Apply(Box<Node>, Rc<dyn Fn(f64) -> f64>),
    Apply2(Box<Node>, Box<Node>, Rc<dyn Fn(f64, f64) -> f64>),
    Cast(Box<Node>, DataType),
}

impl Node {
    pub fn leaf(source: LayerSource) -> Node {
        Node::Leaf(Rc::new(RefCell::new(source)))
    }

    pub fn leaf_shared(source: SharedLayer) -> Node {
        Node::Leaf(source)
    }

    pub fn add(self, rhs: f64) -> Node {
        Node::AddScalar(Box::new(self), rhs)
    }

    pub fn sub(self, rhs: f64) -> Node {
        Node::SubScalar(Box::new(self), rhs)
    }

    pub fn mul(self, rhs: f64) -> Node {
        Node::MulScalar(Box::new(self), rhs)
    }

    pub fn div(self, rhs: f64) -> Node {
        Node::DivScalar(Box::new(self), rhs)
    }

    pub fn add_layer(self, rhs: Node) -> Node {
        Node::Add(Box::new(self), Box::new(rhs))
    }

    pub fn sub_layer(self, rhs: Node) -> Node {
        Node::Sub(Box::new(self), Box::new(rhs))
    }

    pub fn mul_layer(self, rhs: Node) -> Node {
        Node::Mul(Box::new(self), Box::new(rhs))
    }

    pub fn div_layer(self, rhs: Node) -> Node {
        Node::Div(Box::new(self), Box::new(rhs))
    }

    pub fn and(self, rhs: Node) -> Node {
        Node::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Node) -> Node {
        Node::Or(Box::new(self), Box::new(rhs))
    }

    pub fn eq_scalar(self, rhs: f64) -> Node {
        Node::Eq(Box::new(self), rhs)
    }

    pub fn ne_scalar(self, rhs: f64) -> Node {
        Node::Ne(Box::new(self), rhs)
    }

    pub fn ge_scalar(self, rhs: f64) -> Node {
        Node::Ge(Box::new(self), rhs)
    }

    pub fn le_scalar(self, rhs: f64) -> Node {
        Node::Le(Box::new(self), rhs)
    }

    pub fn isin(self, values: impl Into<Rc<[f64]>>) -> Node {
        Node::IsIn(Box::new(self), values.into())
    }

    pub fn where_(cond: Node, if_true: Node, if_false: Node) -> Node {
        Node::Where(Box::new(cond), Box::new(if_true), Box::new(if_false))
    }

    pub fn nan_to_num(self, fill: f64) -> Node {
        Node::NanToNum(Box::new(self), fill)
    }

    pub fn floor(self) -> Node {
        Node::Floor(Box::new(self))
    }

    pub fn powf(self, exponent: f64) -> Node {
        Node::Pow(Box::new(self), exponent)
    }

    pub fn apply(self, f: impl Fn(f64) -> f64 + 'static) -> Node {
        Node::Apply(Box::new(self), Rc::new(f))
    }

    pub fn apply2(self, rhs: Node, f: impl Fn(f64, f64) -> f64 + 'static) -> Node {
        Node::Apply2(Box::new(self), Box::new(rhs), Rc::new(f))
    }

    pub fn cast(self, datatype: DataType) -> Node {
        Node::Cast(Box::new(self), datatype)
    }

    /// The geographic extents this node was built from, walking down to
    /// the leaves. Non-`Constant` leaves win ties; see
    /// `crate::eval::resolve`.
    pub fn inputs(&self) -> Vec<&Node> {
        match self {
            Node::Leaf(_) => vec![],
            Node::AddScalar(a, _)
            | Node::SubScalar(a, _)
            | Node::MulScalar(a, _)
            | Node::DivScalar(a, _)
            | Node::Eq(a, _)
            | Node::Ne(a, _)
            | Node::Ge(a, _)
            | Node::Le(a, _)
            | Node::IsIn(a, _)
            | Node::NanToNum(a, _)
            | Node::Floor(a)
            | Node::Pow(a, _)
            | Node::Apply(a, _)
            | Node::Cast(a, _) => vec![a],
            Node::Add(a, b) | Node::Sub(a, b) | Node::Mul(a, b) | Node::Div(a, b) | Node::And(a, b) | Node::Or(a, b) | Node::Apply2(a, b, _) => {
                vec![a, b]
            }
            Node::Where(c, a, b) => vec![c, a, b],
        }
    }

    pub fn area(&self) -> Option<Area> {
        match self {
            Node::Leaf(l) => Some(l.borrow().area()),
            _ => self.inputs().into_iter().find_map(|n| n.area()),
        }
    }

    pub fn pixel_scale(&self) -> Option<PixelScale> {
        match self {
            Node::Leaf(l) => l.borrow().pixel_scale(),
            _ => self.inputs().into_iter().find_map(|n| n.pixel_scale()),
        }
    }

    /// Every leaf reachable from this node, for `crate::eval::resolve` to
    /// adjust windows on.
    pub fn leaves(&self) -> Vec<SharedLayer> {
        match self {
            Node::Leaf(l) => vec![l.clone()],
            _ => self.inputs().into_iter().flat_map(|n| n.leaves()).collect(),
        }
    }

    /// Evaluates this node for the row-major tile `(xoff, yoff, xsize,
    /// ysize)`, relative to whatever window restriction the leaves
    /// currently carry (set via `resolve`).
    pub fn read_tile(&self, xoff: i64, yoff: i64, xsize: i64, ysize: i64) -> Result<Vec<f64>> {
        match self {
            Node::Leaf(l) => l.borrow().read_window(xoff, yoff, xsize, ysize),
            Node::AddScalar(a, v) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| x + v)?),
            Node::SubScalar(a, v) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| x - v)?),
            Node::MulScalar(a, v) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| x * v)?),
            Node::DivScalar(a, v) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| x / v)?),
            Node::Eq(a, v) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| bool_to_f64(x == *v))?),
            Node::Ne(a, v) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| bool_to_f64(x != *v))?),
            Node::Ge(a, v) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| bool_to_f64(x >= *v))?),
            Node::Le(a, v) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| bool_to_f64(x <= *v))?),
            Node::IsIn(a, values) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| bool_to_f64(values.iter().any(|v| *v == x)))?),
            Node::NanToNum(a, fill) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| if x.is_nan() { *fill } else { x })?),
            Node::Floor(a) => Ok(map1(a, xoff, yoff, xsize, ysize, f64::floor)?),
            Node::Pow(a, exponent) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| x.powf(*exponent))?),
            Node::Apply(a, f) => Ok(map1(a, xoff, yoff, xsize, ysize, |x| f(x))?),
            Node::Cast(a, _) => a.read_tile(xoff, yoff, xsize, ysize),
            Node::Add(a, b) => map2(a, b, xoff, yoff, xsize, ysize, |x, y| x + y),
            Node::Sub(a, b) => map2(a, b, xoff, yoff, xsize, ysize, |x, y| x - y),
            Node::Mul(a, b) => map2(a, b, xoff, yoff, xsize, ysize, |x, y| x * y),
            Node::Div(a, b) => map2(a, b, xoff, yoff, xsize, ysize, |x, y| x / y),
            Node::And(a, b) => map2(a, b, xoff, yoff, xsize, ysize, |x, y| bool_to_f64(x != 0.0 && y != 0.0)),
            Node::Or(a, b) => map2(a, b, xoff, yoff, xsize, ysize, |x, y| bool_to_f64(x != 0.0 || y != 0.0)),
            Node::Apply2(a, b, f) => map2(a, b, xoff, yoff, xsize, ysize, |x, y| f(x, y)),
            Node::Where(c, a, b) => {
                let cond = c.read_tile(xoff, yoff, xsize, ysize)?;
                let tv = a.read_tile(xoff, yoff, xsize, ysize)?;
                let fv = b.read_tile(xoff, yoff, xsize, ysize)?;
                Ok(cond
                    .into_iter()
                    .zip(tv)
                    .zip(fv)
                    .map(|((c, t), f)| if c != 0.0 { t } else { f })
                    .collect())
            }
        }
    }
}

fn bool_to_f64(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn map1(node: &Node, xoff: i64, yoff: i64, xsize: i64, ysize: i64, f: impl Fn(f64) -> f64) -> Result<Vec<f64>> {
    Ok(node.read_tile(xoff, yoff, xsize, ysize)?.into_iter().map(f).collect())
}

fn map2(a: &Node, b: &Node, xoff: i64, yoff: i64, xsize: i64, ysize: i64, f: impl Fn(f64, f64) -> f64) -> Result<Vec<f64>> {
    let av = a.read_tile(xoff, yoff, xsize, ysize)?;
    let bv = b.read_tile(xoff, yoff, xsize, ysize)?;
    Ok(av.into_iter().zip(bv).map(|(x, y)| f(x, y)).collect())
}

/// `where(cond, if_true, if_false)`, matching `yirgacheffe.operators.where`.
pub fn where_(cond: Node, if_true: Node, if_false: Node) -> Node {
    Node::where_(cond, if_true, if_false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::ConstantLayer;

    fn constant(value: f64) -> Node {
        Node::leaf(LayerSource::Constant(ConstantLayer::new(value)))
    }

    #[test]
    fn scalar_arithmetic_chains() {
        let result = constant(4.0).add(1.0).mul(2.0).sub(3.0).div(5.0).read_tile(0, 0, 2, 2).unwrap();
        // ((4 + 1) * 2 - 3) / 5 == 1.4
        assert_eq!(result, vec![1.4; 4]);
    }

    #[test]
    fn layer_arithmetic_between_two_constants() {
        let result = constant(3.0).add_layer(constant(4.0)).read_tile(0, 0, 3, 1).unwrap();
        assert_eq!(result, vec![7.0, 7.0, 7.0]);

        let result = constant(3.0).mul_layer(constant(4.0)).read_tile(0, 0, 1, 1).unwrap();
        assert_eq!(result, vec![12.0]);
    }

    #[test]
    fn comparisons_and_boolean_combinators() {
        assert_eq!(constant(5.0).ge_scalar(5.0).read_tile(0, 0, 1, 1).unwrap(), vec![1.0]);
        assert_eq!(constant(5.0).le_scalar(4.0).read_tile(0, 0, 1, 1).unwrap(), vec![0.0]);
        assert_eq!(constant(5.0).eq_scalar(5.0).and(constant(1.0).ne_scalar(0.0)).read_tile(0, 0, 1, 1).unwrap(), vec![1.0]);
        assert_eq!(constant(0.0).ne_scalar(0.0).or(constant(1.0).ne_scalar(0.0)).read_tile(0, 0, 1, 1).unwrap(), vec![1.0]);
    }

    #[test]
    fn isin_matches_any_listed_code() {
        let result = constant(1402.0).isin(vec![1401.0, 1402.0, 1405.0]).read_tile(0, 0, 1, 1).unwrap();
        assert_eq!(result, vec![1.0]);

        let result = constant(9.0).isin(vec![1.0, 2.0]).read_tile(0, 0, 1, 1).unwrap();
        assert_eq!(result, vec![0.0]);
    }

    #[test]
    fn where_selects_per_condition() {
        let cond = constant(1.0).eq_scalar(1.0);
        let result = where_(cond, constant(10.0), constant(20.0)).read_tile(0, 0, 2, 1).unwrap();
        assert_eq!(result, vec![10.0, 10.0]);
    }

    #[test]
    fn floor_and_pow_and_nan_to_num() {
        assert_eq!(constant(7.0).div(2.0).floor().read_tile(0, 0, 1, 1).unwrap(), vec![3.0]);
        assert_eq!(constant(2.0).powf(3.0).read_tile(0, 0, 1, 1).unwrap(), vec![8.0]);
        assert_eq!(constant(f64::NAN).nan_to_num(-1.0).read_tile(0, 0, 1, 1).unwrap(), vec![-1.0]);
    }

    #[test]
    fn apply_and_apply2_run_arbitrary_closures() {
        let result = constant(3.0).apply(|x| x * x).read_tile(0, 0, 1, 1).unwrap();
        assert_eq!(result, vec![9.0]);

        let result = constant(3.0).apply2(constant(4.0), |x, y| x.max(y)).read_tile(0, 0, 1, 1).unwrap();
        assert_eq!(result, vec![4.0]);
    }

    #[test]
    fn leaves_deduplicates_a_shared_subexpression() {
        let elevation = constant(500.0);
        let combined = elevation.clone().ge_scalar(0.0).and(elevation.le_scalar(1000.0));
        assert_eq!(combined.leaves().len(), 2);
    }

    #[test]
    fn cast_is_a_no_op_on_read_values() {
        let result = constant(42.0).cast(DataType::Float32).read_tile(0, 0, 1, 1).unwrap();
        assert_eq!(result, vec![42.0]);
    }
}
