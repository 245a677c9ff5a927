pub(crate) mod string;
pub(crate) mod style;
pub(crate) mod xml;
pub(crate) mod zip;
