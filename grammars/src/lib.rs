// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! # pegcst grammars
//!
//! Grammars written against the `pegcst` engine.

#![doc(html_root_url = "https://docs.rs/pegcst_grammars")]

pub use pegcst::Parser;

pub mod arithmetic;
pub mod ecma;
