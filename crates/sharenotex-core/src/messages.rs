//! User-facing messages returned by the API.

pub const USER_REGISTERED: &str = "User registered successfully!";
pub const USER_REGISTRATION_FAILED: &str = "User registration failed!";
pub const NOTE_ADDED: &str = "Note added successfully";
pub const NOTE_UPDATED: &str = "Note updated successfully";
pub const NOTE_DELETED: &str = "Note deleted successfully";
pub const NOTE_SHARED: &str = "Note shared successfully";

pub const NOT_FOUND: &str = "Not found";
pub const NOTE_NOT_FOUND: &str = "Note not found";
pub const REALM_NOT_FOUND: &str = "Realm not found";
pub const EMAIL_ALREADY_EXISTS: &str = "User already exists with this email";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
