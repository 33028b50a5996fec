pub(crate) mod corners;
pub(crate) mod cpu;
pub(crate) mod encode;
pub(crate) mod export;
pub(crate) mod svg_raster;
pub(crate) mod text;
