//! RFC 8141 Uniform Resource Names
//!
//! This library parses, validates and serializes URNs and exposes their
//! namespace identifier, namespace-specific string and optional resolution,
//! query and fragment components as typed values that round-trip through
//! their string form.
//!
//! ```
//! use urn8141::Urn;
//!
//! let urn = Urn::parse("urn:example:example.org:resources:example%20resource?=lang=en#intro").unwrap();
//! assert_eq!(urn.nid().as_str(), "example");
//! assert_eq!(urn.nss().parts(), ["example.org", "resources", "example resource"]);
//! assert_eq!(urn.rqf().query().unwrap().get("lang"), Some("en"));
//! assert_eq!(urn.rqf().fragment(), Some("intro"));
//! ```

pub mod builder;
pub mod codec;
pub mod error;
pub mod nid;
pub mod nss;
pub mod policy;
pub mod rqf;
pub mod urn;

pub use builder::UrnBuilder;
pub use error::UrnError;
pub use nid::NamespaceIdentifier;
pub use nss::NamespaceSpecificString;
pub use policy::NidPolicy;
pub use rqf::{Params, RqfComponent};
pub use urn::Urn;
