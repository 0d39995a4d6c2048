//! Integration tests for the trustgate workspace live in `tests/`.
