#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use dejavue::db::db::Db;
    use dejavue::db::documents::{Document, Documents};
    use dejavue::db::eras::{Era, Eras};
    use dejavue::db::error::StoreError;
    use dejavue::db::events::{HistoricalEvent, HistoricalEvents, ImpactLevel};
    use dejavue::db::figures::{HistoricalFigure, HistoricalFigures};
    use dejavue::db::labels::{Label, Labels};
    use dejavue::db::locations::{Location, Locations};
    use dejavue::db::users::{User, Users};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct CatalogueTestContext {
        _temp_dir: TempDir,
        db: Db,
        era_id: i64,
        category_id: i64,
    }

    impl TestContext for CatalogueTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("test.db")).unwrap();

            let mut era = Era::new("Renaissance", 1300, 1600, "Rebirth of classical learning");
            let era_id = Eras::new(&db).save(&mut era).unwrap();
            let mut category = Label::category("Politics", "Affairs of state");
            let category_id = Labels::categories(&db).save(&mut category).unwrap();

            CatalogueTestContext {
                _temp_dir: temp_dir,
                db,
                era_id,
                category_id,
            }
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event_count(db: &Db) -> i64 {
        db.query_row("SELECT COUNT(*) FROM historical_events", [], |row| row.get(0)).unwrap()
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_era_slug_derived_from_name(ctx: &mut CatalogueTestContext) {
        let era = Eras::new(&ctx.db).get(ctx.era_id).unwrap();
        assert_eq!(era.slug, "renaissance");

        let mut era = Era::new("Late Middle Ages", 1250, 1500, "Crisis and recovery");
        Eras::new(&ctx.db).save(&mut era).unwrap();
        assert_eq!(era.slug, "late-middle-ages");
        assert!(Eras::new(&ctx.db).get_by_slug("late-middle-ages").unwrap().is_some());
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_era_slug_conflict(ctx: &mut CatalogueTestContext) {
        let eras = Eras::new(&ctx.db);
        let mut duplicate = Era::new("Renaissance", 1400, 1500, "Again");

        let err = eras.save(&mut duplicate).unwrap_err();
        assert!(err.is_conflict());
        assert!(duplicate.id.is_none());
        assert!(duplicate.slug.is_empty());
        assert_eq!(eras.list().unwrap().len(), 1);
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_eras_listed_by_start_year(ctx: &mut CatalogueTestContext) {
        let eras = Eras::new(&ctx.db);
        eras.save(&mut Era::new("Antiquity", -800, 500, "Classical world")).unwrap();
        eras.save(&mut Era::new("Modern", 1600, 2000, "Modern times")).unwrap();

        let names: Vec<String> = eras.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Antiquity", "Renaissance", "Modern"]);
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_event_end_before_start_is_rejected(ctx: &mut CatalogueTestContext) {
        let mut event = HistoricalEvent::new("Treaty", date(1500, 6, 1), ctx.era_id, ctx.category_id).ending(date(1499, 1, 1));

        let err = HistoricalEvents::new(&ctx.db).save(&mut event).unwrap_err();
        match err {
            StoreError::Invalid(errors) => assert!(errors.has_field("end_date")),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(event.id.is_none());
        assert_eq!(event_count(&ctx.db), 0);
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_event_same_day_end_is_accepted(ctx: &mut CatalogueTestContext) {
        let mut event = HistoricalEvent::new("Coronation", date(1520, 5, 5), ctx.era_id, ctx.category_id).ending(date(1520, 5, 5));
        HistoricalEvents::new(&ctx.db).save(&mut event).unwrap();
        assert!(event.id.is_some());
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_event_significance_bounds(ctx: &mut CatalogueTestContext) {
        let events = HistoricalEvents::new(&ctx.db);

        for (rating, ok) in [(0, false), (1, true), (10, true), (11, false)] {
            let mut event = HistoricalEvent::new("Battle", date(1515, 9, 13), ctx.era_id, ctx.category_id);
            event.significance_rating = rating;
            assert_eq!(events.save(&mut event).is_ok(), ok, "rating {}", rating);
        }
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_event_round_trip_and_update(ctx: &mut CatalogueTestContext) {
        let events = HistoricalEvents::new(&ctx.db);
        let mut event = HistoricalEvent::new("Fall of Constantinople", date(1453, 5, 29), ctx.era_id, ctx.category_id);
        event.impact_level = ImpactLevel::High;
        let id = events.save(&mut event).unwrap();

        let mut stored = events.get(id).unwrap();
        assert_eq!(stored.impact_level, ImpactLevel::High);
        assert_eq!(stored.start_date, date(1453, 5, 29));

        stored.significance_rating = 9;
        events.save(&mut stored).unwrap();
        assert_eq!(events.get(id).unwrap().significance_rating, 9);
        assert_eq!(events.list_by_era(ctx.era_id).unwrap().len(), 1);
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_event_with_missing_era_is_broken_reference(ctx: &mut CatalogueTestContext) {
        let mut event = HistoricalEvent::new("Orphan", date(1500, 1, 1), 9999, ctx.category_id);
        let err = HistoricalEvents::new(&ctx.db).save(&mut event).unwrap_err();
        assert!(matches!(err, StoreError::BrokenReference { .. }));
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_deleting_era_cascades_to_events(ctx: &mut CatalogueTestContext) {
        let events = HistoricalEvents::new(&ctx.db);
        events
            .save(&mut HistoricalEvent::new("Printing press", date(1440, 1, 1), ctx.era_id, ctx.category_id))
            .unwrap();
        assert_eq!(event_count(&ctx.db), 1);

        Eras::new(&ctx.db).delete(ctx.era_id).unwrap();
        assert_eq!(event_count(&ctx.db), 0);
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_deleting_location_clears_event_location(ctx: &mut CatalogueTestContext) {
        let locations = Locations::new(&ctx.db);
        let location_id = locations.save(&mut Location::new("Florence").at(43.7696, 11.2558)).unwrap();

        let events = HistoricalEvents::new(&ctx.db);
        let mut event = HistoricalEvent::new("Medici bank founded", date(1397, 10, 1), ctx.era_id, ctx.category_id);
        event.location_id = Some(location_id);
        let event_id = events.save(&mut event).unwrap();

        locations.delete(location_id).unwrap();
        assert_eq!(events.get(event_id).unwrap().location_id, None);
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_location_coordinates_are_decimal(ctx: &mut CatalogueTestContext) {
        let locations = Locations::new(&ctx.db);

        let id = locations.save(&mut Location::new("Venice").at(45.4408474, 12.3155151)).unwrap();
        let stored = locations.get(id).unwrap();
        assert_eq!(stored.latitude, Some(45.440847));
        assert_eq!(stored.longitude, Some(12.315515));

        let err = locations.save(&mut Location::new("Nowhere").at(1234.5, 0.0)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_related_events_are_directional(ctx: &mut CatalogueTestContext) {
        let events = HistoricalEvents::new(&ctx.db);
        let a = events
            .save(&mut HistoricalEvent::new("Cause", date(1517, 10, 31), ctx.era_id, ctx.category_id))
            .unwrap();
        let b = events
            .save(&mut HistoricalEvent::new("Effect", date(1521, 4, 18), ctx.era_id, ctx.category_id))
            .unwrap();

        events.add_related(a, b).unwrap();
        events.add_related(a, b).unwrap();

        assert_eq!(events.related_events(a).unwrap(), vec![b]);
        assert!(events.related_events(b).unwrap().is_empty());
        assert_eq!(events.related_from(b).unwrap(), vec![a]);
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_key_figures_and_figure_events(ctx: &mut CatalogueTestContext) {
        let events = HistoricalEvents::new(&ctx.db);
        let event_id = events
            .save(&mut HistoricalEvent::new("Sistine ceiling", date(1508, 1, 1), ctx.era_id, ctx.category_id))
            .unwrap();

        let figures = HistoricalFigures::new(&ctx.db);
        let figure_id = figures
            .save(&mut HistoricalFigure::new("Michelangelo", "Sculptor and painter", "Florentine artist"))
            .unwrap();

        events.set_key_figures(event_id, &[figure_id]).unwrap();
        figures.set_associated_events(figure_id, &[event_id]).unwrap();

        assert_eq!(events.key_figures(event_id).unwrap(), vec![figure_id]);
        assert_eq!(figures.associated_events(figure_id).unwrap(), vec![event_id]);

        events.delete(event_id).unwrap();
        assert!(figures.associated_events(figure_id).unwrap().is_empty());
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_document_author_set_null_and_event_cascade(ctx: &mut CatalogueTestContext) {
        let users = Users::new(&ctx.db);
        let author_id = users.save(&mut User::new("scribe@example.com", "Scribe")).unwrap();
        let event_id = HistoricalEvents::new(&ctx.db)
            .save(&mut HistoricalEvent::new("Council of Trent", date(1545, 12, 13), ctx.era_id, ctx.category_id))
            .unwrap();

        let documents = Documents::new(&ctx.db);
        let mut document = Document::new("Decrees", "Canons and decrees");
        document.author_id = Some(author_id);
        document.related_event_id = Some(event_id);
        let document_id = documents.save(&mut document).unwrap();

        users.delete(author_id).unwrap();
        assert_eq!(documents.get(document_id).unwrap().author_id, None);

        HistoricalEvents::new(&ctx.db).delete(event_id).unwrap();
        assert!(documents.get(document_id).unwrap_err().is_not_found());
    }

    #[test_context(CatalogueTestContext)]
    #[test]
    fn test_missing_records_are_not_found(ctx: &mut CatalogueTestContext) {
        assert!(Eras::new(&ctx.db).get(424242).unwrap_err().is_not_found());
        assert!(HistoricalEvents::new(&ctx.db).delete(424242).unwrap_err().is_not_found());
    }
}
