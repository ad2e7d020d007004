//! Tile payload formats.

/// Format requested by the client, selecting the response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileFormat {
    /// Gzip-compressed vector tile.
    #[default]
    Pbf,
    /// Raster tile.
    Png,
}

impl TileFormat {
    /// Parse the `format` query parameter; anything but `png` is a vector tile.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("png") => Self::Png,
            _ => Self::Pbf,
        }
    }

    /// MIME type for the payload.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Pbf => "application/x-protobuf",
            Self::Png => "image/png",
        }
    }

    /// Content encoding, when the stored payload is compressed.
    #[must_use]
    pub const fn content_encoding(self) -> Option<&'static str> {
        match self {
            Self::Pbf => Some("gzip"),
            Self::Png => None,
        }
    }
}
