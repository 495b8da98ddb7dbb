//! Query Pipeline Tests
//!
//! Covers the pure stages applied to a loaded collection: filtering, sorting,
//! pagination, the top-rated ranking and the date parsing they rely on.

#[cfg(test)]
mod tests {
    use crate::books::types::Book;
    use crate::config::PaginationConfig;
    use crate::query::dates::parse_timestamp;
    use crate::query::filter::{matches_search, parse_flag};
    use crate::query::sort::{rank_top_rated, sort_books, sort_reviews_newest_first};
    use crate::query::{
        paginate, BookFilter, BookSort, PageRequest, ReviewFilter, SortField, SortOrder,
    };
    use crate::reviews::types::Review;

    fn book(id: &str, title: &str, price: f64) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: "Jane Doe".to_string(),
            description: "A perfectly ordinary book.".to_string(),
            price,
            image: String::new(),
            isbn: format!("isbn-{}", id),
            genre: vec!["Fiction".to_string()],
            tags: vec![],
            date_published: "2020-01-01".to_string(),
            pages: 100,
            language: "English".to_string(),
            publisher: "Acme".to_string(),
            rating: 0.0,
            review_count: 0,
            in_stock: true,
            featured: false,
            extra: Default::default(),
        }
    }

    fn review(id: &str, book_id: &str, rating: u8, timestamp: &str) -> Review {
        Review {
            id: id.to_string(),
            book_id: book_id.to_string(),
            author: "Reader".to_string(),
            rating,
            title: "Thoughts".to_string(),
            comment: "Worth reading twice.".to_string(),
            timestamp: timestamp.to_string(),
            verified: false,
            extra: Default::default(),
        }
    }

    fn ids(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    // ============================================================
    // FILTER TESTS
    // ============================================================

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let books = vec![book("a", "A", 1.0), book("b", "B", 2.0)];
        let filtered = BookFilter::default().apply(books);
        assert_eq!(ids(&filtered), vec!["a", "b"]);
    }

    #[test]
    fn test_genre_and_author_are_case_insensitive_substrings() {
        let mut scifi = book("a", "Dune", 10.0);
        scifi.genre = vec!["Science Fiction".to_string(), "Classic".to_string()];
        scifi.author = "Frank Herbert".to_string();
        let other = book("b", "Emma", 10.0);

        let filter = BookFilter {
            genre: Some("science".to_string()),
            author: Some("HERB".to_string()),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(vec![scifi, other])), vec!["a"]);
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        // ARRANGE
        let mut cheap_in_stock = book("a", "A", 5.0);
        cheap_in_stock.in_stock = true;
        let mut cheap_out = book("b", "B", 5.0);
        cheap_out.in_stock = false;
        let pricey_in_stock = book("c", "C", 50.0);

        let filter = BookFilter {
            max_price: Some(20.0),
            in_stock: Some(true),
            ..Default::default()
        };

        // ACT
        let filtered = filter.apply(vec![cheap_in_stock, cheap_out, pricey_in_stock]);

        // ASSERT
        assert_eq!(ids(&filtered), vec!["a"]);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let books = vec![book("a", "A", 10.0), book("b", "B", 20.0), book("c", "C", 30.0)];
        let filter = BookFilter {
            min_price: Some(10.0),
            max_price: Some(20.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(books)), vec!["a", "b"]);
    }

    #[test]
    fn test_featured_false_matches_only_non_featured() {
        let mut featured = book("a", "A", 1.0);
        featured.featured = true;
        let plain = book("b", "B", 1.0);

        let filter = BookFilter {
            featured: Some(false),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(vec![featured, plain])), vec!["b"]);
    }

    #[test]
    fn test_search_covers_title_author_description_and_tags() {
        let mut by_tag = book("tag", "Plain", 1.0);
        by_tag.tags = vec!["Dystopia".to_string()];
        let mut by_description = book("desc", "Plain", 1.0);
        by_description.description = "A dystopian novel about surveillance.".to_string();
        let by_title = book("title", "Dystopia Rising", 1.0);
        let miss = book("miss", "Gardening", 1.0);

        for b in [&by_tag, &by_description, &by_title] {
            assert!(matches_search(b, "dystopia"), "{} should match", b.id);
        }
        assert!(!matches_search(&miss, "dystopia"));
    }

    #[test]
    fn test_search_does_not_cover_genre() {
        let mut b = book("a", "Plain", 1.0);
        b.genre = vec!["Horror".to_string()];
        assert!(!matches_search(&b, "horror"));
    }

    #[test]
    fn test_published_range_filters_by_date() {
        let mut old = book("old", "Old", 1.0);
        old.date_published = "1999-05-01".to_string();
        let mut recent = book("recent", "Recent", 1.0);
        recent.date_published = "2021-06-15".to_string();
        let mut garbage = book("garbage", "Garbage", 1.0);
        garbage.date_published = "someday".to_string();

        let filter = BookFilter {
            published_after: parse_timestamp("2000-01-01"),
            published_before: parse_timestamp("2022-01-01"),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(vec![old, recent, garbage])), vec!["recent"]);
    }

    #[test]
    fn test_review_filter_combines_book_rating_and_verified() {
        let mut verified = review("r1", "b1", 5, "2024-01-01T00:00:00Z");
        verified.verified = true;
        let unverified = review("r2", "b1", 5, "2024-01-02T00:00:00Z");
        let low = review("r3", "b1", 2, "2024-01-03T00:00:00Z");
        let other_book = review("r4", "b2", 5, "2024-01-04T00:00:00Z");

        let filter = ReviewFilter {
            book_id: Some("b1".to_string()),
            min_rating: Some(4),
            verified: Some(true),
        };

        let kept = filter.apply(vec![verified, unverified, low, other_book]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "r1");
    }

    #[test]
    fn test_parse_flag_only_accepts_true() {
        assert!(parse_flag("true"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("1"));
        assert!(!parse_flag("TRUE"));
    }

    // ============================================================
    // SORT TESTS
    // ============================================================

    #[test]
    fn test_sort_by_price_both_directions() {
        let mut books = vec![book("a", "A", 20.0), book("b", "B", 5.0), book("c", "C", 12.5)];

        sort_books(
            &mut books,
            BookSort {
                field: SortField::Price,
                order: SortOrder::Asc,
            },
        );
        assert_eq!(ids(&books), vec!["b", "c", "a"]);

        sort_books(
            &mut books,
            BookSort {
                field: SortField::Price,
                order: SortOrder::Desc,
            },
        );
        assert_eq!(ids(&books), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_sort_by_title_ignores_case() {
        let mut books = vec![book("1", "banana", 1.0), book("2", "Apple", 1.0), book("3", "cherry", 1.0)];
        sort_books(
            &mut books,
            BookSort {
                field: SortField::Title,
                order: SortOrder::Asc,
            },
        );
        assert_eq!(ids(&books), vec!["2", "1", "3"]);

        let mut books = vec![
            book("zebra", "Zebra", 1.0),
            book("eclair", "Éclair", 1.0),
            book("upper", "Apple", 1.0),
            book("lower", "apple", 1.0),
        ];
        sort_books(
            &mut books,
            BookSort {
                field: SortField::Title,
                order: SortOrder::Asc,
            },
        );
        assert_eq!(ids(&books), vec!["lower", "upper", "eclair", "zebra"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut books = vec![book("first", "A", 10.0), book("second", "B", 10.0), book("cheap", "C", 1.0)];
        sort_books(
            &mut books,
            BookSort {
                field: SortField::Price,
                order: SortOrder::Asc,
            },
        );
        assert_eq!(ids(&books), vec!["cheap", "first", "second"]);
    }

    #[test]
    fn test_sort_field_parsing() {
        assert_eq!("datePublished".parse::<SortField>(), Ok(SortField::DatePublished));
        assert_eq!("rating".parse::<SortField>(), Ok(SortField::Rating));
        assert!("author".parse::<SortField>().is_err());
        assert!("DESC".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_reviews_newest_first_with_bad_timestamps_last() {
        let mut reviews = vec![
            review("old", "b", 3, "2023-01-01T00:00:00.000Z"),
            review("bad", "b", 3, "not a date"),
            review("new", "b", 3, "2024-06-01T12:00:00.000Z"),
        ];

        sort_reviews_newest_first(&mut reviews);

        let order: Vec<&str> = reviews.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["new", "old", "bad"]);
    }

    // ============================================================
    // TOP-RATED TESTS
    // ============================================================

    #[test]
    fn test_top_rated_ranks_by_rating_times_count() {
        // ARRANGE
        let mut few_perfect = book("few", "A", 1.0);
        few_perfect.rating = 5.0;
        few_perfect.review_count = 1;
        let mut many_good = book("many", "B", 1.0);
        many_good.rating = 4.0;
        many_good.review_count = 10;
        let unrated = book("none", "C", 1.0);

        // ACT
        let ranked = rank_top_rated(vec![few_perfect, unrated, many_good]);

        // ASSERT
        assert_eq!(ids(&ranked), vec!["many", "few", "none"]);
    }

    #[test]
    fn test_top_rated_keeps_collection_order_on_ties_and_caps_at_ten() {
        let books: Vec<Book> = (0..15)
            .map(|i| {
                let mut b = book(&format!("b{}", i), "T", 1.0);
                b.rating = 4.0;
                b.review_count = 2;
                b
            })
            .collect();

        let ranked = rank_top_rated(books);

        assert_eq!(ranked.len(), 10);
        let expected: Vec<String> = (0..10).map(|i| format!("b{}", i)).collect();
        assert_eq!(
            ranked.iter().map(|b| b.id.clone()).collect::<Vec<_>>(),
            expected
        );
    }

    // ============================================================
    // PAGINATION TESTS
    // ============================================================

    #[test]
    fn test_page_request_defaults_and_clamp() {
        let config = PaginationConfig::default();

        assert_eq!(
            PageRequest::resolve(None, None, &config),
            PageRequest { page: 1, limit: 10 }
        );
        assert_eq!(
            PageRequest::resolve(Some(0), Some(500), &config),
            PageRequest { page: 1, limit: 100 }
        );
    }

    #[test]
    fn test_paginate_slices_and_reports_metadata() {
        let items: Vec<u32> = (1..=25).collect();

        let page = paginate(items, PageRequest { page: 3, limit: 10 });

        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.pagination.total, 25);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.page, 3);
        assert_eq!(page.pagination.limit, 10);
    }

    #[test]
    fn test_paginate_past_the_end_is_empty() {
        let page = paginate(vec![1, 2, 3], PageRequest { page: 5, limit: 2 });

        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
    }

    #[test]
    fn test_paginate_empty_collection() {
        let page = paginate(Vec::<u32>::new(), PageRequest { page: 1, limit: 10 });
        assert_eq!(page.pagination.total, 0);
        assert_eq!(page.pagination.total_pages, 0);
    }

    #[test]
    fn test_pages_partition_the_result_set() {
        let items: Vec<u32> = (0..23).collect();
        let limit = 7;

        let mut seen = Vec::new();
        for p in 1..=4 {
            let page = paginate(items.clone(), PageRequest { page: p, limit });
            seen.extend(page.items);
        }

        assert_eq!(seen, items, "Concatenated pages must equal the full result set");
    }

    // ============================================================
    // DATE PARSING TESTS
    // ============================================================

    #[test]
    fn test_parse_timestamp_accepts_iso_shapes() {
        for raw in [
            "2024-03-01",
            "2024-03",
            "2024",
            "2024-03-01T10:00:00Z",
            "2024-03-01T10:00:00.123+02:00",
            "2024-03-01T10:00:00",
            "2024-03-01T10:00",
        ] {
            assert!(parse_timestamp(raw).is_some(), "{} should parse", raw);
        }
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        for raw in ["", "yesterday", "2024-13-01", "2024/03/01"] {
            assert!(parse_timestamp(raw).is_none(), "{} should not parse", raw);
        }
    }

    #[test]
    fn test_offset_timestamps_are_normalized_to_utc() {
        let a = parse_timestamp("2024-03-01T12:00:00+02:00").unwrap();
        let b = parse_timestamp("2024-03-01T10:00:00Z").unwrap();
        assert_eq!(a, b);
    }
}
