#![allow(missing_docs)]

pub(crate) mod html;

pub(crate) use html::assert_valid_html;
