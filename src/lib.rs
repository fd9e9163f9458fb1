// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # asminspect
//!
//! Exports the public surface of a .NET assembly (types, fields, methods and parameters) to a
//! filtered, sorted XML document, or lists the namespaces it exports.
//!
//! Parsing of the PE image and its ECMA-335 metadata is done by [`dotscope`]; this crate
//! decides what is exported, how it is ordered and how type names are displayed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use asminspect::prelude::*;
//!
//! let config = ExportConfig::new("Managed/Assembly-CSharp.dll")
//!     .with_namespace(NamespaceFilter::Only("Game".into()));
//!
//! match Exporter::new(config).run(&mut std::io::stdout())? {
//!     Outcome::Exported { output, .. } => println!("report at {}", output.display()),
//!     Outcome::Namespaces(list) => println!("{} namespaces", list.len()),
//! }
//! # Ok::<(), asminspect::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - The read-only metadata model and the [`metadata::MetadataSource`] trait,
//!   with a `dotscope` backed implementation in [`metadata::loader`]
//! - [`filter`] - Which types and members count as exported
//! - [`naming`] - Display names for declared types
//! - [`report`] - The report tree, its builder and its XML serialization
//! - [`namespaces`] - Namespace discovery mode
//! - [`runlog`] - The timestamped run log
//! - [`config`] and [`export`] - Run configuration and orchestration
//!
//! ## Working without a file
//!
//! Everything except [`export::Exporter::run`] accepts any [`metadata::MetadataSource`].
//! [`metadata::AssemblyMetadata`] is one, so reports can be built from synthetic graphs:
//!
//! ```rust
//! use asminspect::prelude::*;
//!
//! let assembly = AssemblyMetadata::new("Game").with_module(
//!     ModuleMetadata::new("Game.dll")
//!         .with_type(TypeMetadata::new("Game", "Player", Visibility::Public))
//!         .with_type(TypeMetadata::new("Game", "<>c", Visibility::Public)),
//! );
//!
//! let mut log = MemoryLog::new();
//! let report = ReportBuilder::new(ExportFilter::new(None), &mut log).build(&assembly)?;
//! assert_eq!(report.children().len(), 1);
//! # Ok::<(), asminspect::Error>(())
//! ```

#[macro_use]
mod error;

pub mod config;
pub mod export;
pub mod filter;
pub mod metadata;
pub mod namespaces;
pub mod naming;
pub mod prelude;
pub mod report;
pub mod runlog;

/// `asminspect` Result type
pub type Result<T> = std::result::Result<T, Error>;

/// `asminspect` Error type
pub use error::Error;

pub use config::{ExportConfig, NamespaceFilter};
pub use export::{Exporter, Outcome};
