//! Unit tests for the request module.
//!
//! Tests are organised by component: the response contract, the dispatch
//! schema, the default validator, and the layered pipeline.
