pub mod editor;
pub mod input;
pub mod logging;
pub mod spinner;
#[cfg(test)]
pub mod test_utils;
