use failure_derive::*;

#[derive(Debug, Fail)]
pub enum ErrorKind {
    #[fail(display = "name strength {} is not one of 0, 1 or 2", _0)]
    InvalidNameStrength(u8),
    #[fail(display = "expected a net record of type scn but got {}", _0)]
    UnexpectedRecordType(String),
    #[fail(display = "document item has no type: {}", _0)]
    UntypedItem(String),
    #[fail(display = "expected a JSON array of items at the top level")]
    NotADocument,
    #[fail(display = "snap grid must be [major, minor] but got {}", _0)]
    BadSnapGrid(String),
    #[fail(display = "unknown net {}", _0)]
    UnknownNet(String),
}
