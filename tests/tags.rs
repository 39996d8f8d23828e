#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use dejavue::db::content_types::ContentRef;
    use dejavue::db::db::Db;
    use dejavue::db::eras::{Era, Eras};
    use dejavue::db::error::StoreError;
    use dejavue::db::events::{HistoricalEvent, HistoricalEvents};
    use dejavue::db::labels::{Label, Labels};
    use dejavue::db::tags::{EventTag, EventTags, Tag, Tags, TAG_NAME_MAX_LENGTH};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct TagTestContext {
        _temp_dir: TempDir,
        db: Db,
        era_id: i64,
        event_ids: Vec<i64>,
    }

    impl TestContext for TagTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("test.db")).unwrap();

            let era_id = Eras::new(&db)
                .save(&mut Era::new("Industrial Age", 1760, 1914, "Mechanisation"))
                .unwrap();
            let category_id = Labels::categories(&db).save(&mut Label::category("Technology", "Inventions")).unwrap();
            let events = HistoricalEvents::new(&db);
            let event_ids = ["Spinning jenny", "Steam engine"]
                .iter()
                .map(|name| {
                    let start = NaiveDate::from_ymd_opt(1765, 1, 1).unwrap();
                    events.save(&mut HistoricalEvent::new(name, start, era_id, category_id)).unwrap()
                })
                .collect();

            TagTestContext {
                _temp_dir: temp_dir,
                db,
                era_id,
                event_ids,
            }
        }
    }

    #[test_context(TagTestContext)]
    #[test]
    fn test_tag_slug_suffixes(ctx: &mut TagTestContext) {
        let tags = Tags::new(&ctx.db);

        let mut first = Tag::new("Steam Power");
        let mut second = Tag::new("steam power!");
        let mut third = Tag::new("STEAM  POWER");
        tags.save(&mut first).unwrap();
        tags.save(&mut second).unwrap();
        tags.save(&mut third).unwrap();

        assert_eq!(first.slug, "steam-power");
        assert_eq!(second.slug, "steam-power_1");
        assert_eq!(third.slug, "steam-power_2");
    }

    #[test_context(TagTestContext)]
    #[test]
    fn test_suffixed_slug_fits_name_limit(ctx: &mut TagTestContext) {
        let tags = Tags::new(&ctx.db);
        let stem = "a".repeat(TAG_NAME_MAX_LENGTH - 1);

        let mut first = Tag::new(&format!("{}?", stem));
        let mut second = Tag::new(&format!("{}-", stem));
        let mut third = Tag::new(&format!("{}!", stem));
        tags.save(&mut first).unwrap();
        tags.save(&mut second).unwrap();
        tags.save(&mut third).unwrap();

        assert_eq!(first.slug, stem);
        assert_eq!(second.slug, format!("{}_1", "a".repeat(TAG_NAME_MAX_LENGTH - 2)));
        assert_eq!(third.slug, format!("{}_2", "a".repeat(TAG_NAME_MAX_LENGTH - 2)));
        for tag in [&first, &second, &third] {
            assert!(tag.slug.chars().count() <= TAG_NAME_MAX_LENGTH);
        }
    }

    #[test_context(TagTestContext)]
    #[test]
    fn test_tag_name_conflict(ctx: &mut TagTestContext) {
        let tags = Tags::new(&ctx.db);
        tags.save(&mut Tag::new("textiles")).unwrap();

        let err = tags.save(&mut Tag::new("textiles")).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test_context(TagTestContext)]
    #[test]
    fn test_tag_without_slug_characters(ctx: &mut TagTestContext) {
        let mut tag = Tag::new("???");
        Tags::new(&ctx.db).save(&mut tag).unwrap();
        assert_eq!(tag.slug, "tag");
    }

    #[test_context(TagTestContext)]
    #[test]
    fn test_tagging_events(ctx: &mut TagTestContext) {
        let tags = Tags::new(&ctx.db);
        let first = ContentRef::Event(ctx.event_ids[0]);
        let second = ContentRef::Event(ctx.event_ids[1]);

        tags.add(&first, &["textiles", "invention"]).unwrap();
        tags.add(&second, &["invention"]).unwrap();
        tags.add(&first, &["invention"]).unwrap();

        let names: Vec<String> = tags.tags_for(&first).unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["invention", "textiles"]);

        let invention = tags.get_by_name("invention").unwrap().unwrap();
        assert_eq!(tags.tagged_with(invention.id.unwrap()).unwrap(), vec![first, second]);

        tags.set(&first, &["mills"]).unwrap();
        let names: Vec<String> = tags.tags_for(&first).unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["mills"]);

        tags.remove(&second, "invention").unwrap();
        assert!(tags.tags_for(&second).unwrap().is_empty());
    }

    #[test_context(TagTestContext)]
    #[test]
    fn test_tags_removed_with_event(ctx: &mut TagTestContext) {
        let tags = Tags::new(&ctx.db);
        let target = ContentRef::Event(ctx.event_ids[0]);
        tags.add(&target, &["doomed"]).unwrap();
        let tag_id = tags.get_by_name("doomed").unwrap().unwrap().id.unwrap();

        HistoricalEvents::new(&ctx.db).delete(ctx.event_ids[0]).unwrap();

        assert!(tags.tagged_with(tag_id).unwrap().is_empty());
        assert!(tags.get(tag_id).is_ok());
    }

    #[test_context(TagTestContext)]
    #[test]
    fn test_only_taggable_records_accept_tags(ctx: &mut TagTestContext) {
        let tags = Tags::new(&ctx.db);

        match tags.add(&ContentRef::Era(ctx.era_id), &["old"]).unwrap_err() {
            StoreError::Invalid(errors) => assert!(errors.has_field("content_object")),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(tags.add(&ContentRef::Event(777777), &["ghost"]).unwrap_err().is_not_found());
        assert!(tags.get_by_name("ghost").unwrap().is_none());
    }

    #[test_context(TagTestContext)]
    #[test]
    fn test_event_tags(ctx: &mut TagTestContext) {
        let event_tags = EventTags::new(&ctx.db);
        event_tags.save(&mut EventTag::new("Economy")).unwrap();
        event_tags.save(&mut EventTag::new("Labour")).unwrap();

        assert_eq!(event_tags.list().unwrap().len(), 2);
        assert!(event_tags.save(&mut EventTag::new("")).unwrap_err().is_validation());
    }
}
