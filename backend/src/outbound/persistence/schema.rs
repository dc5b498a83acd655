//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate them with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered users. Only read by the match engine.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Cat catalog. The engine reads it and flips `has_matched` on approval.
    cats (id) {
        id -> Uuid,
        owned_by_id -> Uuid,
        name -> Varchar,
        race -> Varchar,
        /// `male` or `female`.
        sex -> Varchar,
        age_in_month -> Int4,
        description -> Text,
        image_urls -> Array<Text>,
        has_matched -> Bool,
        /// Soft-delete flag.
        deleted -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Match requests.
    cat_matches (id) {
        id -> Uuid,
        created_at -> Timestamptz,
        issued_by_id -> Uuid,
        /// Candidate cat: the cat being proposed to.
        match_cat_id -> Uuid,
        /// Requester cat: the issuer's cat.
        user_cat_id -> Uuid,
        message -> Varchar,
        /// `waiting`, `approved` or `rejected`.
        status -> Varchar,
    }
}

diesel::joinable!(cats -> users (owned_by_id));
diesel::joinable!(cat_matches -> users (issued_by_id));

diesel::allow_tables_to_appear_in_same_query!(users, cats, cat_matches);
