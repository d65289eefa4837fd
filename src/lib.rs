//! # Signal Scout
//!
//! A batch pipeline for discovering, scoring, and correlating startup-idea
//! mentions across public sources.
//!
//! Signal Scout collects candidate mentions from configured text sources
//! (forum APIs, code-host search, web-search proxies), deduplicates and
//! persists them in SQLite, scores each item with a multi-factor relevance
//! model, clusters recent items into cross-platform trends, and rolls
//! everything up into daily report snapshots.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────┐
//! │  Collectors  │──▶│ Dedup+Score  │──▶│  SQLite    │
//! │ forum/code/  │   │  Cluster     │   │  items     │
//! │  websearch   │   │  Correlate   │   │  reports   │
//! └──────────────┘   └──────────────┘   └────┬──────┘
//!                                            │
//!                        ┌──────────────────┬┘
//!                        ▼                  ▼
//!                   ┌──────────┐      ┌──────────┐
//!                   │   CLI    │      │   HTTP   │
//!                   │ (scout)  │      │  (jobs)  │
//!                   └──────────┘      └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! scout init                    # create database
//! scout collect                 # pull from all configured sources
//! scout engine                  # full run: collect, score, cluster, correlate
//! scout report                  # write today's snapshot
//! scout serve                   # start the job HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`collector_forum`] | Forum API collector |
//! | [`collector_codehost`] | Code-host search collector |
//! | [`collector_websearch`] | Web-search proxy collector |
//! | [`scoring`] | Multi-factor relevance scoring |
//! | [`dedup`] | Duplicate detection |
//! | [`cluster`] | Similarity-based topic clustering |
//! | [`correlate`] | Cluster aggregation and velocity |
//! | [`report`] | Daily report rollup |
//! | [`engine`] | Pipeline orchestration |
//! | [`server`] | Job HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod cluster;
pub mod collector_codehost;
pub mod collector_forum;
pub mod collector_websearch;
pub mod config;
pub mod correlate;
pub mod db;
pub mod dedup;
pub mod engine;
pub mod keywords;
pub mod llm;
pub mod migrate;
pub mod models;
pub mod report;
pub mod scoring;
pub mod server;
pub mod sources;
pub mod store;
