#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use dejavue::db::alternatives::{AlternativeScenario, AlternativeScenarios, PROBABILITY_MAX, PROBABILITY_MIN};
    use dejavue::db::consequences::{Consequence, Consequences};
    use dejavue::db::db::Db;
    use dejavue::db::eras::{Era, Eras};
    use dejavue::db::error::StoreError;
    use dejavue::db::events::{HistoricalEvent, HistoricalEvents};
    use dejavue::db::labels::{Label, Labels};
    use dejavue::db::predictions::{Prediction, Predictions};
    use dejavue::db::scenarios::{Scenario, ScenarioEvent, ScenarioImpact, Scenarios};
    use dejavue::db::timelines::{Timeline, TimelineEvent, Timelines};
    use dejavue::db::users::{User, Users};
    use dejavue::db::what_if::{WhatIfScenario, WhatIfScenarios, WhatIfTimeline, WhatIfTimelines};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ScenarioTestContext {
        _temp_dir: TempDir,
        db: Db,
        user_id: i64,
        event_ids: Vec<i64>,
    }

    impl TestContext for ScenarioTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("test.db")).unwrap();

            let user_id = Users::new(&db).save(&mut User::new("historian@example.com", "Historian")).unwrap();
            let era_id = Eras::new(&db)
                .save(&mut Era::new("Age of Sail", 1571, 1862, "Naval dominance"))
                .unwrap();
            let category_id = Labels::categories(&db).save(&mut Label::category("War", "Armed conflict")).unwrap();

            let events = HistoricalEvents::new(&db);
            let event_ids = ["Lepanto", "Armada", "Trafalgar"]
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let start = NaiveDate::from_ymd_opt(1571 + 100 * i as i32, 10, 7).unwrap();
                    events.save(&mut HistoricalEvent::new(name, start, era_id, category_id)).unwrap()
                })
                .collect();

            ScenarioTestContext {
                _temp_dir: temp_dir,
                db,
                user_id,
                event_ids,
            }
        }
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_alternative_probability_bounds(ctx: &mut ScenarioTestContext) {
        let alternatives = AlternativeScenarios::new(&ctx.db);
        let event_id = ctx.event_ids[0];

        for (probability, ok) in [
            (PROBABILITY_MIN - 1, false),
            (PROBABILITY_MIN, true),
            (PROBABILITY_MAX, true),
            (PROBABILITY_MAX + 1, false),
        ] {
            let mut alternative =
                AlternativeScenario::new(event_id, "Ottoman victory", "The Holy League is routed", probability, ctx.user_id);
            let result = alternatives.save(&mut alternative);
            assert_eq!(result.is_ok(), ok, "probability {}", probability);
            if let Err(StoreError::Invalid(errors)) = result {
                assert_eq!(errors.fields(), vec!["probability"]);
            }
        }

        assert_eq!(alternatives.list_for_event(event_id).unwrap().len(), 2);
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_alternatives_cascade_with_event(ctx: &mut ScenarioTestContext) {
        let alternatives = AlternativeScenarios::new(&ctx.db);
        let event_id = ctx.event_ids[1];
        let id = alternatives
            .save(&mut AlternativeScenario::new(event_id, "Armada lands", "Parma crosses the Channel", 30, ctx.user_id))
            .unwrap();

        HistoricalEvents::new(&ctx.db).delete(event_id).unwrap();
        assert!(alternatives.get(id).unwrap_err().is_not_found());
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_consequence_impact_range(ctx: &mut ScenarioTestContext) {
        let consequences = Consequences::new(&ctx.db);
        let event_id = ctx.event_ids[2];

        let mut low = Consequence::new(event_id, "British naval supremacy", 1, "Century");
        let mut high = Consequence::new(event_id, "End of invasion threat", 10, "Immediate");
        let mut out_of_range = Consequence::new(event_id, "Too much", 11, "Never");
        let mut zero = Consequence::new(event_id, "Too little", 0, "Never");

        consequences.save(&mut low).unwrap();
        consequences.save(&mut high).unwrap();
        assert!(consequences.save(&mut out_of_range).unwrap_err().is_validation());
        assert!(consequences.save(&mut zero).unwrap_err().is_validation());
        assert_eq!(consequences.list_for_event(event_id).unwrap().len(), 2);
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_timeline_append_keeps_order(ctx: &mut ScenarioTestContext) {
        let timelines = Timelines::new(&ctx.db);
        let timeline_id = timelines
            .save(&mut Timeline::new("Naval battles", "Decisive fleet actions", ctx.user_id))
            .unwrap();

        let third = timelines.append(timeline_id, ctx.event_ids[2], "").unwrap();
        let first = timelines.append(timeline_id, ctx.event_ids[0], "opening").unwrap();

        assert_eq!(third.order, 0);
        assert_eq!(first.order, 1);
        assert_eq!(timelines.event_ids(timeline_id).unwrap(), vec![ctx.event_ids[2], ctx.event_ids[0]]);
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_timeline_entries_follow_explicit_order(ctx: &mut ScenarioTestContext) {
        let timelines = Timelines::new(&ctx.db);
        let timeline_id = timelines
            .save(&mut Timeline::new("Ordered by hand", "Explicit positions", ctx.user_id))
            .unwrap();

        for (&event_id, order) in ctx.event_ids.iter().zip([30, 10, 20]) {
            timelines.save_entry(&mut TimelineEvent::new(timeline_id, event_id, order)).unwrap();
        }

        let orders: Vec<i64> = timelines.entries(timeline_id).unwrap().into_iter().map(|e| e.order).collect();
        assert_eq!(orders, vec![10, 20, 30]);
        assert_eq!(
            timelines.event_ids(timeline_id).unwrap(),
            vec![ctx.event_ids[1], ctx.event_ids[2], ctx.event_ids[0]]
        );
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_timeline_reorder(ctx: &mut ScenarioTestContext) {
        let timelines = Timelines::new(&ctx.db);
        let timeline_id = timelines
            .save(&mut Timeline::new("Reordered", "Shuffled events", ctx.user_id))
            .unwrap();
        let entries: Vec<i64> = ctx
            .event_ids
            .iter()
            .map(|&event_id| timelines.append(timeline_id, event_id, "").unwrap().id.unwrap())
            .collect();

        timelines.reorder(timeline_id, &[entries[2], entries[0], entries[1]]).unwrap();
        assert_eq!(
            timelines.event_ids(timeline_id).unwrap(),
            vec![ctx.event_ids[2], ctx.event_ids[0], ctx.event_ids[1]]
        );
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_timeline_reorder_with_foreign_entry_changes_nothing(ctx: &mut ScenarioTestContext) {
        let timelines = Timelines::new(&ctx.db);
        let mine = timelines.save(&mut Timeline::new("Mine", "Mine", ctx.user_id)).unwrap();
        let other = timelines.save(&mut Timeline::new("Other", "Other", ctx.user_id)).unwrap();

        let a = timelines.append(mine, ctx.event_ids[0], "").unwrap().id.unwrap();
        let b = timelines.append(mine, ctx.event_ids[1], "").unwrap().id.unwrap();
        let foreign = timelines.append(other, ctx.event_ids[2], "").unwrap().id.unwrap();

        let err = timelines.reorder(mine, &[b, foreign, a]).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(timelines.event_ids(mine).unwrap(), vec![ctx.event_ids[0], ctx.event_ids[1]]);
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_timelines_cascade_with_creator(ctx: &mut ScenarioTestContext) {
        let timelines = Timelines::new(&ctx.db);
        let timeline_id = timelines.save(&mut Timeline::new("Owned", "Owned", ctx.user_id)).unwrap();
        timelines.append(timeline_id, ctx.event_ids[0], "").unwrap();

        Users::new(&ctx.db).delete(ctx.user_id).unwrap();
        assert!(timelines.get(timeline_id).unwrap_err().is_not_found());
        assert!(timelines.entries(timeline_id).unwrap().is_empty());
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_scenario_event_altered_dates(ctx: &mut ScenarioTestContext) {
        let scenarios = Scenarios::new(&ctx.db);
        let scenario_id = scenarios
            .save(&mut Scenario::new("Delayed battle", "The fleets meet later", Some(ctx.user_id)))
            .unwrap();

        let mut entry = ScenarioEvent::new(scenario_id, ctx.event_ids[0], "Winter storms scatter both fleets", ScenarioImpact::Major);
        entry.altered_start_date = NaiveDate::from_ymd_opt(1572, 3, 1);
        entry.altered_end_date = NaiveDate::from_ymd_opt(1572, 2, 1);

        match scenarios.save_event(&mut entry).unwrap_err() {
            StoreError::Invalid(errors) => assert!(errors.has_field("altered_end_date")),
            other => panic!("expected validation error, got {:?}", other),
        }

        entry.altered_end_date = NaiveDate::from_ymd_opt(1572, 4, 1);
        let id = scenarios.save_event(&mut entry).unwrap();
        assert_eq!(scenarios.get_event(id).unwrap().impact, ScenarioImpact::Major);
        assert_eq!(scenarios.events(scenario_id).unwrap().len(), 1);
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_scenario_creator_set_null(ctx: &mut ScenarioTestContext) {
        let scenarios = Scenarios::new(&ctx.db);
        let scenario_id = scenarios
            .save(&mut Scenario::new("Orphaned", "Creator leaves", Some(ctx.user_id)))
            .unwrap();

        Users::new(&ctx.db).delete(ctx.user_id).unwrap();
        assert_eq!(scenarios.get(scenario_id).unwrap().created_by_id, None);
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_prediction_links(ctx: &mut ScenarioTestContext) {
        let scenario_id = Scenarios::new(&ctx.db)
            .save(&mut Scenario::new("Forecast", "Looking ahead", None))
            .unwrap();
        let predictions = Predictions::new(&ctx.db);
        let mut prediction = Prediction::new(
            "Steam era",
            "Sail gives way to steam",
            NaiveDate::from_ymd_opt(1850, 1, 1).unwrap(),
            scenario_id,
            ctx.user_id,
        );
        let id = predictions.save(&mut prediction).unwrap();

        predictions.set_based_on(id, &[ctx.event_ids[2], ctx.event_ids[0]]).unwrap();
        predictions.set_predicted_events(id, &[ctx.event_ids[1]]).unwrap();

        assert_eq!(predictions.based_on(id).unwrap(), vec![ctx.event_ids[0], ctx.event_ids[2]]);
        assert_eq!(predictions.predicted_events(id).unwrap(), vec![ctx.event_ids[1]]);

        prediction.confidence_level = f64::NAN;
        assert!(predictions.save(&mut prediction).unwrap_err().is_validation());
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_what_if_scenarios_cascade_with_timeline(ctx: &mut ScenarioTestContext) {
        let timelines = WhatIfTimelines::new(&ctx.db);
        let timeline_id = timelines
            .save(&mut WhatIfTimeline::new("Baseline", "What actually happened"))
            .unwrap();
        timelines.set_events(timeline_id, &ctx.event_ids).unwrap();

        let scenarios = WhatIfScenarios::new(&ctx.db);
        let scenario_id = scenarios
            .save(&mut WhatIfScenario::new("No Armada", "Philip stays home", timeline_id))
            .unwrap();
        scenarios.set_modified_events(scenario_id, &[ctx.event_ids[1]]).unwrap();

        assert_eq!(scenarios.modifying(ctx.event_ids[1]).unwrap(), vec![scenario_id]);
        assert_eq!(scenarios.list_for_timeline(timeline_id).unwrap().len(), 1);

        timelines.delete(timeline_id).unwrap();
        assert!(scenarios.get(scenario_id).unwrap_err().is_not_found());
        assert!(scenarios.modifying(ctx.event_ids[1]).unwrap().is_empty());
    }

    #[test_context(ScenarioTestContext)]
    #[test]
    fn test_what_if_link_to_missing_event(ctx: &mut ScenarioTestContext) {
        let timelines = WhatIfTimelines::new(&ctx.db);
        let timeline_id = timelines.save(&mut WhatIfTimeline::new("Sparse", "Few events")).unwrap();

        let err = timelines.add_event(timeline_id, 987654).unwrap_err();
        assert!(err.is_not_found());
        assert!(timelines.events(timeline_id).unwrap().is_empty());
    }
}
