//! Tests for the code service
