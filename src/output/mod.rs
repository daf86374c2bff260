//! Encoding and output of issued certificates.
//!
//! Certificates leave the library as DER bytes; this module armors them as
//! PEM and writes them to `<name>.pem` fixture files.

pub mod pem;
