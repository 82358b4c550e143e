//! Type tags of the record format

/// Tag byte that starts every encoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    // 0x00 is reserved
    None = 0x01,
    Bool = 0x02,
    Int = 0x03,
    Float = 0x04,
    Text = 0x05,
    Bytes = 0x06,

    // Lists and tuples share a layout; the tag keeps them apart
    List = 0x07,
    Tuple = 0x08,
    Set = 0x09,
    Map = 0x0a,
}

impl DataType {
    /// Convert from u8 to DataType
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(DataType::None),
            0x02 => Some(DataType::Bool),
            0x03 => Some(DataType::Int),
            0x04 => Some(DataType::Float),
            0x05 => Some(DataType::Text),
            0x06 => Some(DataType::Bytes),
            0x07 => Some(DataType::List),
            0x08 => Some(DataType::Tuple),
            0x09 => Some(DataType::Set),
            0x0a => Some(DataType::Map),
            _ => None,
        }
    }

    /// Convert to u8
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// True for tags whose payload holds nested records
    pub fn is_container(self) -> bool {
        matches!(
            self,
            DataType::List | DataType::Tuple | DataType::Set | DataType::Map
        )
    }
}
