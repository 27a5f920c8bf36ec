//! # Snippet Collector
//!
//! **Save, de-duplicate, search, and export code snippets copied from the web.**
//!
//! The engine lives in [`snippet_collector_core`]; this crate supplies the
//! native storage backends, configuration, and the `scc` command-line
//! front end.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌────────────────┐   ┌──────────────┐
//! │   Capture    │──▶│ Normalizer  │──▶│   Collection   │──▶│ KeyValueStore│
//! │ sanitize+lang│   │ hash, ids   │   │ dedup, cap     │   │ SQLite / dir │
//! └──────────────┘   └─────────────┘   └───────┬────────┘   └──────────────┘
//!                                              │
//!                                 ┌────────────┴───────────┐
//!                                 ▼                        ▼
//!                           ┌──────────┐             ┌──────────┐
//!                           │  search  │             │  export  │
//!                           └──────────┘             └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! scc init
//! scc add --file snippet.py --title "Flask docs" --tag python --tag web
//! scc search flask --tag python
//! scc export markdown --output snippets.md
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`storage`] | Backend selection |
//! | [`sqlite_store`] | Persistent SQLite key-value backend |
//! | [`fallback_store`] | Directory-backed fallback backend |
//! | [`add`] | Capture → sanitize → save |
//! | [`search`] | Listing and search output |
//! | [`get`] | Single-snippet retrieval and clipboard text |
//! | [`export`] | JSON / Markdown export |
//! | [`settings_cmd`] | Settings inspection and updates |
//! | [`tag`] | Tag editing and the tag inventory |

pub mod add;
pub mod config;
pub mod export;
pub mod fallback_store;
pub mod get;
pub mod search;
pub mod settings_cmd;
pub mod sqlite_store;
pub mod storage;
pub mod tag;
