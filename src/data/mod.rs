//! Dataset acquisition: HTTP download and RData decoding

mod downloader;
pub mod rdata;

pub use downloader::{convert_rdata_to_csv, DataDownloader};
pub use rdata::{read_data_frame, read_rdata, RObject, RValue};
