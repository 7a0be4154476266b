// ABOUTME: Read-only verification queries run after applying the upsert file
// ABOUTME: Row count, most recent rows, domain-filtered rows, and active rows

use super::upsert::escape_sql_literal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationQuery {
    pub label: String,
    pub sql: String,
}

/// The fixed verification battery
///
/// `domain` selects the rows of the domain-filtered query.
pub fn verification_queries(domain: &str) -> Vec<VerificationQuery> {
    let domain = escape_sql_literal(domain.trim().trim_start_matches('@'));

    vec![
        VerificationQuery {
            label: "Counting rows".to_string(),
            sql: "SELECT COUNT(*) as total FROM api_keys;".to_string(),
        },
        VerificationQuery {
            label: "Listing most recent keys".to_string(),
            sql: "SELECT api_key, gmail_email, is_active, created_at FROM api_keys ORDER BY created_at DESC LIMIT 10;".to_string(),
        },
        VerificationQuery {
            label: format!("Listing {} addresses", domain),
            sql: format!("SELECT * FROM api_keys WHERE gmail_email LIKE '%{}';", domain),
        },
        VerificationQuery {
            label: "Listing active keys".to_string(),
            sql: "SELECT * FROM api_keys WHERE is_active = 1;".to_string(),
        },
    ]
}
