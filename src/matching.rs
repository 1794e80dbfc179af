//! Matching requests against donations.
//!
//! A request/donation pair is admissible when the grades are exactly equal
//! and the cities are equal after trimming and lowercasing. Admissible pairs
//! are scored with a token-sort ratio over the two subject strings and kept
//! when the score exceeds the configured threshold.
//!
//! The scan is a nested loop over both tables, O(R·D). The tables are small
//! enough that nothing cleverer is warranted.

use serde::Serialize;

use crate::domain::{BookRequest, Donation};

/// A candidate pairing of a request with a donation.
///
/// Derived on every view and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// The request side of the pair.
    pub request: BookRequest,
    /// The donation side of the pair.
    pub donation: Donation,
    /// Token-sort similarity of the two subjects, 0–100.
    pub score: u8,
}

/// Computes all candidate matches between the given tables.
///
/// Output order is request-major, donation-minor: the order in which the
/// nested scan encounters admissible pairs. The result is stable and is not
/// sorted by score; recomputing over an unchanged store yields an identical
/// sequence.
#[must_use]
pub fn find_matches(requests: &[BookRequest], donations: &[Donation], threshold: u8) -> Vec<Match> {
    let mut matches = Vec::new();

    for request in requests {
        for donation in donations {
            if request.grade != donation.grade
                || normalized_city(&request.city) != normalized_city(&donation.city)
            {
                continue;
            }

            let score = token_sort_ratio(&request.subject, &donation.subject);
            if score > threshold {
                matches.push(Match {
                    request: request.clone(),
                    donation: donation.clone(),
                    score,
                });
            }
        }
    }

    matches
}

/// Scores two strings on a 0–100 scale, insensitive to word order.
///
/// Both inputs are lowercased, split on whitespace, token-sorted and
/// rejoined before being compared with an indel ratio.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);

    // The ratio is normalized to 0.0..=1.0; scale up before the cast.
    (rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0).round() as u8
}

fn sorted_tokens(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn normalized_city(city: &str) -> String {
    city.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Condition, Urgency};

    fn request(subject: &str, grade: &str, city: &str) -> BookRequest {
        BookRequest {
            owner: "bob".to_string(),
            subject: subject.to_string(),
            grade: grade.to_string(),
            city: city.to_string(),
            urgency: Urgency::Medium,
            email: "bob@example.com".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    fn donation(subject: &str, grade: &str, city: &str) -> Donation {
        Donation {
            owner: "alice".to_string(),
            book: format!("{subject} textbook"),
            subject: subject.to_string(),
            grade: grade.to_string(),
            condition: Condition::Good,
            city: city.to_string(),
            email: "alice@example.com".to_string(),
            image: String::new(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn similar_subjects_in_same_city_and_grade_match() {
        let requests = [request("Algebra", "9", "Springfield")];
        let donations = [donation("Algebra I", "9", "springfield ")];

        let matches = find_matches(&requests, &donations, 80);

        assert_eq!(matches.len(), 1);
        assert!(matches[0].score > 80);
    }

    #[test]
    fn differing_grade_never_matches() {
        let requests = [request("Algebra", "9", "Springfield")];
        let donations = [donation("Algebra I", "10", "Springfield")];

        assert!(find_matches(&requests, &donations, 80).is_empty());
    }

    #[test]
    fn differing_city_never_matches() {
        let requests = [request("Algebra", "9", "Springfield")];
        let donations = [donation("Algebra", "9", "Shelbyville")];

        assert!(find_matches(&requests, &donations, 80).is_empty());
    }

    #[test]
    fn city_comparison_ignores_case_and_surrounding_whitespace() {
        let requests = [request("Chemistry", "11", "  SPRINGFIELD")];
        let donations = [donation("Chemistry", "11", "springfield ")];

        assert_eq!(find_matches(&requests, &donations, 80).len(), 1);
    }

    #[test]
    fn dissimilar_subjects_never_match() {
        let requests = [request("Algebra", "9", "Springfield")];
        let donations = [donation("World History", "9", "Springfield")];

        assert!(find_matches(&requests, &donations, 80).is_empty());
    }

    #[test]
    fn scores_at_the_threshold_are_excluded() {
        let requests = [request("Algebra", "9", "Springfield")];
        let donations = [donation("Algebra", "9", "Springfield")];

        // Identical subjects score 100, which a threshold of 100 excludes.
        assert!(find_matches(&requests, &donations, 100).is_empty());
        assert_eq!(find_matches(&requests, &donations, 99).len(), 1);
    }

    #[test]
    fn output_is_request_major_donation_minor() {
        let requests = [
            request("Biology", "8", "Springfield"),
            request("Biology", "8", "Springfield"),
        ];
        let donations = [
            donation("Biology", "8", "Springfield"),
            donation("Biology", "8", "Springfield"),
        ];

        let matches = find_matches(&requests, &donations, 80);

        let order: Vec<(usize, usize)> = matches
            .iter()
            .map(|m| {
                (
                    requests.iter().position(|r| *r == m.request).unwrap(),
                    donations.iter().position(|d| *d == m.donation).unwrap(),
                )
            })
            .collect();
        assert_eq!(order, [(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn recomputation_over_unchanged_tables_is_identical() {
        let requests = [
            request("Algebra", "9", "Springfield"),
            request("Physics", "12", "Shelbyville"),
        ];
        let donations = [
            donation("Algebra I", "9", "springfield"),
            donation("Physics", "12", "Shelbyville"),
        ];

        let first = find_matches(&requests, &donations, 80);
        let second = find_matches(&requests, &donations, 80);
        assert_eq!(first, second);
    }

    #[test]
    fn token_sort_ratio_is_on_a_percentage_scale() {
        // One two-character insertion against 16 characters in total.
        assert_eq!(token_sort_ratio("Algebra", "Algebra I"), 88);
    }

    #[test]
    fn token_sort_ratio_ignores_word_order() {
        assert_eq!(token_sort_ratio("world history", "history world"), 100);
    }

    #[test]
    fn token_sort_ratio_is_case_insensitive() {
        assert_eq!(token_sort_ratio("ALGEBRA", "algebra"), 100);
    }

    #[test]
    fn token_sort_ratio_of_unrelated_strings_is_low() {
        assert!(token_sort_ratio("algebra", "zoology field guide") < 50);
    }
}
