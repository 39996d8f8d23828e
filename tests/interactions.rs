#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use dejavue::db::alternatives::{AlternativeScenario, AlternativeScenarios};
    use dejavue::db::db::Db;
    use dejavue::db::debates::{Argument, DebateStatus, HistoricalDebate, HistoricalDebates};
    use dejavue::db::eras::{Era, Eras};
    use dejavue::db::events::{HistoricalEvent, HistoricalEvents};
    use dejavue::db::interactions::{Interaction, InteractionType, Interactions};
    use dejavue::db::labels::{Label, Labels};
    use dejavue::db::simulations::{Difficulty, Simulation, Simulations, UserDecision};
    use dejavue::db::users::{User, Users};
    use serde_json::json;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct InteractionTestContext {
        _temp_dir: TempDir,
        db: Db,
        user_id: i64,
        event_id: i64,
        alternative_id: i64,
    }

    impl TestContext for InteractionTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("test.db")).unwrap();

            let user_id = Users::new(&db).save(&mut User::new("student@example.com", "Student")).unwrap();
            let era_id = Eras::new(&db)
                .save(&mut Era::new("Bronze Age", -3300, -1200, "Early metallurgy"))
                .unwrap();
            let category_id = Labels::categories(&db).save(&mut Label::category("Collapse", "Systems failure")).unwrap();
            let event_id = HistoricalEvents::new(&db)
                .save(&mut HistoricalEvent::new(
                    "Battle of Kadesh",
                    NaiveDate::from_ymd_opt(-1274, 5, 1).unwrap(),
                    era_id,
                    category_id,
                ))
                .unwrap();
            let alternative_id = AlternativeScenarios::new(&db)
                .save(&mut AlternativeScenario::new(event_id, "Hittite rout", "Egypt wins outright", 25, user_id))
                .unwrap();

            InteractionTestContext {
                _temp_dir: temp_dir,
                db,
                user_id,
                event_id,
                alternative_id,
            }
        }
    }

    #[test_context(InteractionTestContext)]
    #[test]
    fn test_interactions_in_insertion_order(ctx: &mut InteractionTestContext) {
        let interactions = Interactions::new(&ctx.db);

        for kind in [InteractionType::View, InteractionType::Edit, InteractionType::Predict] {
            let mut interaction = Interaction::new(ctx.user_id, kind).on_event(ctx.event_id);
            interactions.record(&mut interaction).unwrap();
        }

        let kinds: Vec<InteractionType> = interactions
            .list_for_user(ctx.user_id)
            .unwrap()
            .into_iter()
            .map(|i| i.interaction_type)
            .collect();
        assert_eq!(kinds, vec![InteractionType::View, InteractionType::Edit, InteractionType::Predict]);
        assert_eq!(interactions.list_for_event(ctx.event_id).unwrap().len(), 3);
    }

    #[test_context(InteractionTestContext)]
    #[test]
    fn test_interactions_are_append_only(ctx: &mut InteractionTestContext) {
        let interactions = Interactions::new(&ctx.db);
        let mut interaction = Interaction::new(ctx.user_id, InteractionType::Create).with_details("drafted a scenario");
        let id = interactions.record(&mut interaction).unwrap();

        interaction.details = "rewritten".to_string();
        assert!(interactions.record(&mut interaction).unwrap_err().is_validation());
        assert_eq!(interactions.get(id).unwrap().details, "drafted a scenario");
    }

    #[test]
    fn test_interaction_choice_codes() {
        assert_eq!("predict".parse::<InteractionType>().unwrap(), InteractionType::Predict);
        assert!("delete".parse::<InteractionType>().is_err());
    }

    #[test]
    fn test_difficulty_parses_code_or_label() {
        assert_eq!("3".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("EASY".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("7".parse::<Difficulty>().is_err());
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test_context(InteractionTestContext)]
    #[test]
    fn test_simulation_decisions(ctx: &mut InteractionTestContext) {
        let simulations = Simulations::new(&ctx.db);
        let mut simulation = Simulation::new("Command at Kadesh", ctx.alternative_id, Difficulty::Hard);
        simulation.parameters = json!({ "chariots": 2000, "weather": "clear" });
        let simulation_id = simulations.save(&mut simulation).unwrap();

        let stored = simulations.get(simulation_id).unwrap();
        assert_eq!(stored.parameters["chariots"], 2000);
        assert_eq!(stored.difficulty_level, Difficulty::Hard);

        let mut first = UserDecision::new(simulation_id, ctx.user_id, "Ambush", "Hold the line", "Camp survives");
        let mut second = UserDecision::new(simulation_id, ctx.user_id, "Relief", "Wait for Ne'arin", "Flank secured");
        simulations.record_decision(&mut first).unwrap();
        simulations.record_decision(&mut second).unwrap();

        let points: Vec<String> = simulations
            .decisions(simulation_id)
            .unwrap()
            .into_iter()
            .map(|d| d.decision_point)
            .collect();
        assert_eq!(points, vec!["Ambush", "Relief"]);

        assert!(simulations.record_decision(&mut first).unwrap_err().is_validation());
    }

    #[test_context(InteractionTestContext)]
    #[test]
    fn test_simulations_cascade_with_alternative(ctx: &mut InteractionTestContext) {
        let simulations = Simulations::new(&ctx.db);
        let simulation_id = simulations
            .save(&mut Simulation::new("Doomed", ctx.alternative_id, Difficulty::Easy))
            .unwrap();

        AlternativeScenarios::new(&ctx.db).delete(ctx.alternative_id).unwrap();
        assert!(simulations.get(simulation_id).unwrap_err().is_not_found());
    }

    #[test_context(InteractionTestContext)]
    #[test]
    fn test_debate_status_transitions(ctx: &mut InteractionTestContext) {
        let debates = HistoricalDebates::new(&ctx.db);
        let id = debates
            .save(&mut HistoricalDebate::new("Who won at Kadesh?", ctx.event_id))
            .unwrap();
        assert_eq!(debates.get(id).unwrap().status, DebateStatus::Active);

        debates.set_status(id, DebateStatus::Archived).unwrap();
        debates.set_status(id, DebateStatus::Active).unwrap();
        debates.set_status(id, DebateStatus::Concluded).unwrap();

        assert_eq!(debates.list_by_status(DebateStatus::Concluded).unwrap().len(), 1);
        assert!(debates.list_by_status(DebateStatus::Active).unwrap().is_empty());
        assert!(debates.set_status(999, DebateStatus::Active).unwrap_err().is_not_found());
    }

    #[test_context(InteractionTestContext)]
    #[test]
    fn test_debate_arguments(ctx: &mut InteractionTestContext) {
        let debates = HistoricalDebates::new(&ctx.db);
        let debate_id = debates.save(&mut HistoricalDebate::new("Treaty terms", ctx.event_id)).unwrap();

        let mut argument = Argument::new(debate_id, ctx.user_id, "Both sides claimed victory", "Temple reliefs");
        argument.credibility_score = 0.6;
        debates.save_argument(&mut argument).unwrap();

        let mut unsourced = Argument::new(debate_id, ctx.user_id, "Egypt won", "");
        assert!(debates.save_argument(&mut unsourced).unwrap_err().is_validation());

        assert_eq!(debates.arguments(debate_id).unwrap().len(), 1);

        debates.delete(debate_id).unwrap();
        assert!(debates.arguments(debate_id).unwrap().is_empty());
    }
}
