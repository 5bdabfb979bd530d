//! Static checks over parsed pointer-path expressions.

pub mod resolve;
