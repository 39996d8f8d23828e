#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use dejavue::db::content_types::ContentRef;
    use dejavue::db::db::Db;
    use dejavue::db::entities::{HistoricalConnection, HistoricalEntities, HistoricalEntity};
    use dejavue::db::eras::{Era, Eras};
    use dejavue::db::error::StoreError;
    use dejavue::db::events::{HistoricalEvent, HistoricalEvents};
    use dejavue::db::fact_checks::{FactCheck, FactChecks, VerificationStatus};
    use dejavue::db::labels::{Label, Labels};
    use dejavue::db::locations::{Location, Locations};
    use dejavue::db::patterns::{HistoricalPattern, HistoricalPatterns, PredictiveModel, PredictiveModels};
    use dejavue::db::quality::{QualityMetrics, QualityMetricsStore};
    use dejavue::db::users::{User, Users};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct AnalyticsTestContext {
        _temp_dir: TempDir,
        db: Db,
        event_id: i64,
    }

    impl TestContext for AnalyticsTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("test.db")).unwrap();

            let era_id = Eras::new(&db)
                .save(&mut Era::new("Enlightenment", 1685, 1815, "Age of reason"))
                .unwrap();
            let category_id = Labels::categories(&db)
                .save(&mut Label::category("Revolution", "Overthrow of an order"))
                .unwrap();
            let event_id = HistoricalEvents::new(&db)
                .save(&mut HistoricalEvent::new(
                    "Storming of the Bastille",
                    NaiveDate::from_ymd_opt(1789, 7, 14).unwrap(),
                    era_id,
                    category_id,
                ))
                .unwrap();

            AnalyticsTestContext {
                _temp_dir: temp_dir,
                db,
                event_id,
            }
        }
    }

    fn entity(db: &Db, name: &str) -> i64 {
        let location_id = Locations::new(db).save(&mut Location::new("Paris")).unwrap();
        HistoricalEntities::new(db)
            .save(&mut HistoricalEntity::new(
                name,
                "A political body",
                NaiveDate::from_ymd_opt(1789, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(1799, 1, 1).unwrap(),
                location_id,
            ))
            .unwrap()
    }

    #[test_context(AnalyticsTestContext)]
    #[test]
    fn test_quality_metrics_round_trip(ctx: &mut AnalyticsTestContext) {
        let store = QualityMetricsStore::new(&ctx.db);
        let target = ContentRef::Event(ctx.event_id);

        let mut metrics = QualityMetrics::new(target, "REVIEWED").scores(0.9, 0.75, 0.8);
        let id = store.save(&mut metrics).unwrap();

        let stored = store.get(id).unwrap();
        assert_eq!(stored.target, target);
        assert_eq!(stored.accuracy_score, 0.9);
        assert_eq!(store.for_target(&target).unwrap().len(), 1);
    }

    #[test_context(AnalyticsTestContext)]
    #[test]
    fn test_quality_metrics_missing_target(ctx: &mut AnalyticsTestContext) {
        let store = QualityMetricsStore::new(&ctx.db);
        let mut metrics = QualityMetrics::new(ContentRef::Figure(31337), "PENDING");

        let err = store.save(&mut metrics).unwrap_err();
        assert!(err.is_not_found());
        assert!(metrics.id.is_none());
    }

    #[test_context(AnalyticsTestContext)]
    #[test]
    fn test_quality_metrics_reject_nan(ctx: &mut AnalyticsTestContext) {
        let store = QualityMetricsStore::new(&ctx.db);
        let mut metrics = QualityMetrics::new(ContentRef::Event(ctx.event_id), "PENDING").scores(f64::NAN, 0.0, 0.0);

        match store.save(&mut metrics).unwrap_err() {
            StoreError::Invalid(errors) => assert_eq!(errors.fields(), vec!["accuracy_score"]),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test_context(AnalyticsTestContext)]
    #[test]
    fn test_quality_metrics_removed_with_target(ctx: &mut AnalyticsTestContext) {
        let store = QualityMetricsStore::new(&ctx.db);
        let target = ContentRef::Event(ctx.event_id);
        let id = store.save(&mut QualityMetrics::new(target, "PENDING")).unwrap();

        HistoricalEvents::new(&ctx.db).delete(ctx.event_id).unwrap();

        assert!(store.get(id).unwrap_err().is_not_found());
        assert!(store.for_target(&target).unwrap().is_empty());
    }

    #[test_context(AnalyticsTestContext)]
    #[test]
    fn test_fact_check_verifiers_must_be_staff(ctx: &mut AnalyticsTestContext) {
        let users = Users::new(&ctx.db);
        let staff_id = users.save(&mut User::new("editor@example.com", "Editor").staff()).unwrap();
        let reader_id = users.save(&mut User::new("reader@example.com", "Reader")).unwrap();

        let fact_checks = FactChecks::new(&ctx.db);
        let mut fact_check = FactCheck::new(ctx.event_id, "The Bastille held seven prisoners");
        let id = fact_checks.save(&mut fact_check).unwrap();
        assert_eq!(fact_checks.get(id).unwrap().verification_status, VerificationStatus::Pending);

        match fact_checks.set_verifiers(id, &[staff_id, reader_id]).unwrap_err() {
            StoreError::Invalid(errors) => assert_eq!(errors.fields(), vec!["verified_by"]),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(fact_checks.verifiers(id).unwrap().is_empty());

        fact_checks.set_verifiers(id, &[staff_id]).unwrap();
        assert_eq!(fact_checks.verifiers(id).unwrap(), vec![staff_id]);

        assert!(fact_checks.add_verifier(id, reader_id).unwrap_err().is_validation());
    }

    #[test_context(AnalyticsTestContext)]
    #[test]
    fn test_fact_check_status_update(ctx: &mut AnalyticsTestContext) {
        let fact_checks = FactChecks::new(&ctx.db);
        let mut fact_check = FactCheck::new(ctx.event_id, "The crowd sought gunpowder");
        let id = fact_checks.save(&mut fact_check).unwrap();

        fact_check.verification_status = VerificationStatus::Verified;
        fact_checks.save(&mut fact_check).unwrap();

        assert_eq!(fact_checks.get(id).unwrap().verification_status, VerificationStatus::Verified);
        assert_eq!(VerificationStatus::Verified.to_string(), "Verified");
    }

    #[test_context(AnalyticsTestContext)]
    #[test]
    fn test_patterns_and_models(ctx: &mut AnalyticsTestContext) {
        let patterns = HistoricalPatterns::new(&ctx.db);
        let pattern_id = patterns
            .save(&mut HistoricalPattern::new("Fiscal crisis", "Debt precedes revolt", "CYCLICAL", 0.7))
            .unwrap();
        patterns.set_events(pattern_id, &[ctx.event_id]).unwrap();

        let models = PredictiveModels::new(&ctx.db);
        let model_id = models
            .save(&mut PredictiveModel::new("Unrest", "Revolt risk", "Uprising", 0.4))
            .unwrap();
        models.set_patterns(model_id, &[pattern_id]).unwrap();

        assert_eq!(patterns.events(pattern_id).unwrap(), vec![ctx.event_id]);
        assert_eq!(models.patterns(model_id).unwrap(), vec![pattern_id]);

        patterns.delete(pattern_id).unwrap();
        assert!(models.patterns(model_id).unwrap().is_empty());
    }

    #[test_context(AnalyticsTestContext)]
    #[test]
    fn test_entity_connections(ctx: &mut AnalyticsTestContext) {
        let source = entity(&ctx.db, "National Assembly");
        let target = entity(&ctx.db, "Jacobin Club");

        let entities = HistoricalEntities::new(&ctx.db);
        let mut connection = HistoricalConnection::new(source, target, "INFLUENCED", 0.8, "Shared membership");
        let id = entities.save_connection(&mut connection).unwrap();

        assert_eq!(entities.outgoing(source).unwrap()[0].id, Some(id));
        assert_eq!(entities.incoming(target).unwrap()[0].source_id, source);
        assert!(entities.outgoing(target).unwrap().is_empty());

        entities.delete(source).unwrap();
        assert!(entities.incoming(target).unwrap().is_empty());
    }
}
