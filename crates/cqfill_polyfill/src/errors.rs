//! Error results that can be returned from the polyfill layer
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("css: compilation error: {0}")]
    CssCompile(String),

    #[error("css: selector needs a ':not(.container-query-polyfill)' guard to be rewritten: {0}")]
    UnguardedSelector(String),
}
