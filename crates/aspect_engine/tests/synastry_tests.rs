use aspect_engine::aspects::{AspectCatalog, AspectKind, InstantAspectFinder};
use aspect_engine::ephemeris::{Body, ChartPoint};
use aspect_engine::synastry::{base_score, Category, SynastryScorer};
use aspect_engine::zodiac::ElementBalance;

fn chart(points: &[(Body, f64)]) -> Vec<ChartPoint> {
    points.iter().map(|&(b, lon)| ChartPoint::new(b, lon)).collect()
}

#[test]
fn test_missing_categories_score_zero_and_total_is_not_renormalised() {
    // only an exact Moon-Venus conjunction: emotional is 10, the others 0
    let first = chart(&[(Body::Moon, 100.0)]);
    let second = chart(&[(Body::Venus, 100.0)]);
    let report = SynastryScorer::default().compare(&first, &second).unwrap();
    let scores = &report.scores;

    assert_eq!(scores.get(Category::Emotional).unwrap().score, 10.0);
    assert_eq!(scores.get(Category::Emotional).unwrap().matches, 1);
    for category in [Category::Communication, Category::Chemistry, Category::Stability] {
        assert_eq!(scores.get(category).unwrap().score, 0.0);
        assert_eq!(scores.get(category).unwrap().matches, 0);
    }
    // both charts are all Cancer: identical element mix
    assert_eq!(scores.get(Category::ElementalBalance).unwrap().score, 10.0);

    let expected = 0.25 * 10.0 + 0.10 * 10.0;
    assert!((scores.total - expected).abs() < 1e-12);
}

#[test]
fn test_no_aspects_at_all() {
    let scorer = SynastryScorer::default();
    let scores = scorer.score(&[], &ElementBalance::default(), &ElementBalance::default());
    assert!(scores.categories.iter().all(|c| c.score == 0.0));
    assert_eq!(scores.total, 0.0);
    assert_eq!(scores.categories.len(), Category::ALL.len());
}

#[test]
fn test_category_averages_watched_pairs_only() {
    let first = chart(&[(Body::Venus, 10.0), (Body::Jupiter, 200.0)]);
    let second = chart(&[
        (Body::Mars, 130.0), // Venus trine Mars, exact
        (Body::Sun, 100.0),  // Venus square Sun, exact
        (Body::Saturn, 200.0),
    ]);
    let scorer = SynastryScorer::new(AspectCatalog::standard());
    let report = scorer.compare(&first, &second).unwrap();

    // Jupiter-Saturn conjunction is found but watched by no category
    assert!(report
        .aspects
        .iter()
        .any(|a| a.joins(Body::Jupiter, Body::Saturn)));

    let chemistry = report.scores.get(Category::Chemistry).unwrap();
    assert_eq!(chemistry.matches, 2);
    let expected = (base_score(AspectKind::Trine) + base_score(AspectKind::Square)) / 2.0;
    assert!((chemistry.score - expected).abs() < 1e-12);
    assert_eq!(report.scores.get(Category::Stability).unwrap().score, 0.0);
}

#[test]
fn test_pairs_are_order_insensitive() {
    let scorer = SynastryScorer::default();
    let a = chart(&[(Body::Saturn, 50.0)]);
    let b = chart(&[(Body::Moon, 52.0)]);
    let forward = scorer.compare(&a, &b).unwrap();
    let backward = scorer.compare(&b, &a).unwrap();
    assert_eq!(
        forward.scores.get(Category::Stability).unwrap().score,
        backward.scores.get(Category::Stability).unwrap().score
    );
    assert!(forward.scores.get(Category::Stability).unwrap().score > 0.0);
}

#[test]
fn test_weak_aspects_score_lower() {
    let aspects_tight = InstantAspectFinder::new(AspectCatalog::natal())
        .synastry(
            &chart(&[(Body::Mercury, 10.0)]),
            &chart(&[(Body::Mercury, 11.0)]),
        )
        .unwrap();
    let aspects_wide = InstantAspectFinder::new(AspectCatalog::natal())
        .synastry(
            &chart(&[(Body::Mercury, 10.0)]),
            &chart(&[(Body::Mercury, 18.0)]),
        )
        .unwrap();
    let empty = ElementBalance::default();
    let scorer = SynastryScorer::default();
    let tight = scorer.score(&aspects_tight, &empty, &empty);
    let wide = scorer.score(&aspects_wide, &empty, &empty);

    let tight = tight.get(Category::Communication).unwrap().score;
    let wide = wide.get(Category::Communication).unwrap().score;
    assert!((tight - 9.0).abs() < 1e-12);
    assert!((wide - 2.0).abs() < 1e-12);
}

#[test]
fn test_opposite_elements_score_zero_balance() {
    let fire = chart(&[(Body::Sun, 5.0), (Body::Moon, 125.0)]);
    let water = chart(&[(Body::Sun, 95.0), (Body::Moon, 215.0)]);
    let report = SynastryScorer::default().compare(&fire, &water).unwrap();
    assert_eq!(report.scores.get(Category::ElementalBalance).unwrap().score, 0.0);
}

#[test]
fn test_report_serializes() {
    let report = SynastryScorer::default()
        .compare(&chart(&[(Body::Moon, 1.0)]), &chart(&[(Body::Moon, 3.0)]))
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["scores"]["categories"][0]["category"], "emotional");
    assert_eq!(json["first_traits"]["key_signs"]["moon"], "aries");
}
