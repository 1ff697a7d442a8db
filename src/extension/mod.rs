//! CPA extension handling: value normalization, typed blocks and XML assembly.

pub mod assembler;
pub mod blocks;
pub mod normalizer;

pub use assembler::{assemble, AftParams, FragmentKind, XmlFragment};
pub use blocks::{CpaExtensions, ExtensionBlock, OrderParam, SubmerchantData};
pub use normalizer::{normalize, ExtensionType, NormalizedExtensionValue};
