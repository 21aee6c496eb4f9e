mod parse_bad;
pub(crate) mod utils;
