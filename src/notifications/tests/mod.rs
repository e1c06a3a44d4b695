//! Notification system tests
