// TIFF header offsets where ghost data begins
const CLASSIC_TIFF_GHOST_DATA_OFFSET: usize = 8;
const BIGTIFF_GHOST_DATA_OFFSET: usize = 16;
// Size of the GDAL metadata header line "GDAL_STRUCTURAL_METADATA_SIZE=XXXXXX bytes\n"
const GDAL_METADATA_HEADER_LINE_SIZE: usize = 43;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CogBlockOrder {
    RowMajor,
    ColumnMajor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CogLayout {
    IfdsBeforeData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockLeader {
    SizeAsUint4,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockTrailer {
    Last4BytesRepeated,
}

#[derive(Debug, Clone, Default)]
pub struct GdalGhostData {
    pub known_incompatible_edition: bool,
    pub layout: Option<CogLayout>,
    pub block_order: Option<CogBlockOrder>,
    pub block_leader: Option<BlockLeader>,
    pub block_trailer: Option<BlockTrailer>,
}

impl GdalGhostData {
    pub fn from_tiff_header_buffer(header: &[u8]) -> Option<GdalGhostData> {
        let is_big_tiff = match header[2] {
            0x2a => false, // Classic TIFF magic number
            0x2b => true,  // BigTIFF magic number
            _ => return None,
        };

        let offset = if is_big_tiff {
            BIGTIFF_GHOST_DATA_OFFSET
        } else {
            CLASSIC_TIFF_GHOST_DATA_OFFSET
        };
        debug_assert!(
            header.len() >= offset + GDAL_METADATA_HEADER_LINE_SIZE,
            "Provided header is too small to contain GDAL metadata"
        );

        // GDAL_STRUCTURAL_METADATA_SIZE=XXXXXX bytes\n
        if let Ok(first_line) = std::str::from_utf8(&header[offset..offset + GDAL_METADATA_HEADER_LINE_SIZE]) {
            // The header size is at bytes 30..36 (6 bytes)
            let header_size_str = &first_line[30..36];
            let header_size: usize = match header_size_str.trim().parse() {
                Ok(size) => size,
                Err(_) => return None, // Return None if header size is malformed
            };

            // Check bounds to prevent buffer overflow
            let metadata_start = offset + GDAL_METADATA_HEADER_LINE_SIZE;
            let metadata_end = metadata_start + header_size;

            if metadata_end > header.len() {
                // Size is larger than available buffer, return None for malformed data
                return None;
            }

            let header_str = String::from_utf8_lossy(&header[metadata_start..metadata_end]);
            parse_ghost_metadata(&header_str)
        } else {
            None
        }
    }

    pub fn is_cog(&self) -> bool {
        self.layout == Some(CogLayout::IfdsBeforeData)
            && !self.known_incompatible_edition
            && self.block_order == Some(CogBlockOrder::RowMajor)
            && self.block_leader == Some(BlockLeader::SizeAsUint4)
            && self.block_trailer == Some(BlockTrailer::Last4BytesRepeated)
    }
}

fn parse_ghost_metadata(header_str: &str) -> Option<GdalGhostData> {
    let mut ghost_data = GdalGhostData::default();

    header_str
        .split('\n')
        .filter_map(|s| -> Option<(&str, &str)> {
            s.find('=').map(|pos| {
                let (key, value) = s.split_at(pos);
                (key, &value[1..])
            })
        })
        .for_each(|(key, value)| match key {
            "KNOWN_INCOMPATIBLE_EDITION" => {
                ghost_data.known_incompatible_edition = value.trim() != "NO";
            }
            "LAYOUT" => {
                ghost_data.layout = match value.trim() {
                    "IFDS_BEFORE_DATA" => Some(CogLayout::IfdsBeforeData),
                    _ => None,
                };
            }
            "BLOCK_ORDER" => {
                ghost_data.block_order = match value.trim() {
                    "ROW_MAJOR" => Some(CogBlockOrder::RowMajor),
                    "COLUMN_MAJOR" => Some(CogBlockOrder::ColumnMajor),
                    _ => None,
                };
            }
            "BLOCK_LEADER" => {
                ghost_data.block_leader = match value.trim() {
                    "SIZE_AS_UINT4" => Some(BlockLeader::SizeAsUint4),
                    _ => None,
                };
            }
            "BLOCK_TRAILER" => {
                ghost_data.block_trailer = match value.trim() {
                    "LAST_4_BYTES_REPEATED" => Some(BlockTrailer::Last4BytesRepeated),
                    _ => None,
                };
            }
            _ => {}
        });

    Some(ghost_data)
}
