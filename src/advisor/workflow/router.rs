// SPDX-License-Identifier: MIT

use super::state::Branch;

/// Any of these (case-insensitive substring) sends a query to the course catalog
pub const COURSE_KEYWORDS: [&str; 3] = ["course", "prerequisite", "catalog"];

pub fn route(query: &str) -> Branch {
    let q = query.to_lowercase();
    let branch = if COURSE_KEYWORDS.iter().any(|k| q.contains(k)) {
        Branch::Course
    } else {
        Branch::Web
    };
    log::info!("router node: {}", branch);
    branch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerequisite_any_case_goes_to_course() {
        assert_eq!(route("What are the Prerequisites for CS101?"), Branch::Course);
    }

    #[test]
    fn test_other_queries_go_to_web() {
        assert_eq!(route("What's the weather today?"), Branch::Web);
        assert_eq!(route(""), Branch::Web);
    }

    #[test]
    fn test_each_keyword_routes_to_course() {
        for query in [
            "Which COURSES cover Rust?",
            "prerequisite chain for MATH200",
            "show me the Catalog",
            "coursework load for juniors", // substring match, not word match
        ] {
            assert_eq!(route(query), Branch::Course, "query: {}", query);
        }
    }
}
