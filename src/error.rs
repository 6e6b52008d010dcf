use std::io;
use thiserror::Error;

use crate::file::FileError;

#[derive(Error, Debug)]
pub enum MdsMapError {
    #[error("Contig length table parsing error: {0}")]
    LengthTableError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
    #[error("File reading error: {0}")]
    FileError(#[from] FileError),
    #[error("Malformed map XML: {0}")]
    XmlParseError(#[from] quick_xml::DeError),
    #[error("Could not serialize map XML: {0}")]
    XmlWriteError(#[from] quick_xml::SeError),
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),
    #[error("Map XML is not valid UTF-8: {0}")]
    EncodingError(#[from] std::string::FromUtf8Error),
    #[error("Missing field")]
    MissingField,
    #[error("Failed to parse a column of the contig length table: {0}")]
    ParseError(String),
    #[error("Contig '{0}' is referenced by a map but absent from the contig length table")]
    MissingLength(String),
    #[error("Contig '{0}' has no MDS intervals to validate")]
    EmptyContig(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
