pub mod heap_file;
pub mod heap_file_encoder;
pub mod heap_file_scan;

#[cfg(test)]
mod heap_file_test;
