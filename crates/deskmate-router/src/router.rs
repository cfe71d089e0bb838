// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route selection from category and sentiment.
//!
//! Priority order: negative sentiment escalates > category dispatch.

use deskmate_core::{Category, Route, Sentiment};
use tracing::info;

/// Selects the destination for a classified query.
pub fn route(category: Category, sentiment: Sentiment) -> Route {
    let destination = match (sentiment, category) {
        (Sentiment::Negative, _) => Route::EscalateToHuman,
        (_, Category::Technical) => Route::Technical,
        (_, Category::Billing) => Route::Billing,
        (_, Category::General) => Route::General,
    };

    info!(
        category = %category,
        sentiment = %sentiment,
        route = %destination,
        "routing decision"
    );
    destination
}

/// Routes from raw label strings, treating unrecognized labels as General / Neutral.
pub fn route_labels(raw_category: &str, raw_sentiment: &str) -> Route {
    let category = Category::from_label(raw_category).unwrap_or(Category::General);
    let sentiment = Sentiment::from_label(raw_sentiment).unwrap_or(Sentiment::Neutral);
    route(category, sentiment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_sentiment_always_escalates() {
        for category in Category::ALL {
            assert_eq!(route(category, Sentiment::Negative), Route::EscalateToHuman);
        }
    }

    #[test]
    fn non_negative_routes_by_category() {
        for sentiment in [Sentiment::Positive, Sentiment::Neutral] {
            assert_eq!(route(Category::Technical, sentiment), Route::Technical);
            assert_eq!(route(Category::Billing, sentiment), Route::Billing);
            assert_eq!(route(Category::General, sentiment), Route::General);
        }
    }

    #[test]
    fn every_input_maps_to_exactly_one_destination() {
        let mut seen = 0;
        for category in Category::ALL {
            for sentiment in Sentiment::ALL {
                let destination = route(category, sentiment);
                match destination.category() {
                    Some(c) => assert_eq!(c, category),
                    None => assert_eq!(sentiment, Sentiment::Negative),
                }
                seen += 1;
            }
        }
        assert_eq!(seen, 9);
    }

    #[test]
    fn raw_labels_default_to_general_neutral() {
        assert_eq!(route_labels("Billing", "Neutral"), Route::Billing);
        assert_eq!(route_labels("Technical", "Negative"), Route::EscalateToHuman);
        assert_eq!(route_labels("Marketing", "Neutral"), Route::General);
        assert_eq!(route_labels("Technical", "Confused"), Route::Technical);
        assert_eq!(route_labels("", ""), Route::General);
    }
}
