//! gridlayer - offline MBTiles archives with an MGRS grid overlay
//!
//! This library turns a remote tiled map service into a self-contained
//! MBTiles archive. For a configured region and zoom range it enumerates the
//! covering tiles, fetches each base raster, draws the MGRS grid lines and
//! zone labels for that tile, and stores the result keyed by zoom, column
//! and row.
//!
//! # High-Level API
//!
//! ```ignore
//! use gridlayer::composite::{LabelRenderer, TileCompositor};
//! use gridlayer::fetch::{ReqwestClient, TileFetcher};
//! use gridlayer::orchestrator::{Orchestrator, OrchestratorConfig};
//! use gridlayer::region::Region;
//! use std::sync::Arc;
//!
//! let region = Region::load("greece.json".as_ref())?;
//! let source = Arc::new(TileFetcher::new(ReqwestClient::new()?));
//! let compositor = Arc::new(TileCompositor::new(LabelRenderer::resolve(None, 14.0)));
//!
//! let orchestrator = Orchestrator::new(source, compositor, OrchestratorConfig::default())?;
//! let summary = orchestrator.run(&region)?;
//! println!("{} of {} tiles stored", summary.succeeded, summary.total);
//! ```

pub mod archive;
pub mod composite;
pub mod coord;
pub mod fetch;
pub mod logging;
pub mod mgrs;
pub mod orchestrator;
pub mod overlay;
pub mod region;
pub mod settings;

/// Version of the gridlayer library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
