// tests/extraction.rs

//! End-to-end checks over saved portal pages.

use std::fs;
use std::path::PathBuf;

use chrono::Weekday;
use portal_core::models::{
    Config, FieldChange, GradeDelta, GradeField, ScoreLabel, SimulationVerdict, SubjectGrade,
    TableOutcome,
};
use portal_core::pipeline::Simulator;
use portal_core::services::{GradeParser, ScheduleParser};

fn fixture(name: &str) -> String {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", name]
        .iter()
        .collect();
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

fn grades(name: &str) -> Vec<SubjectGrade> {
    portal_core::parse_grades(&fixture(name))
        .parsed()
        .expect("results table present")
}

fn find<'a>(grades: &'a [SubjectGrade], subject: &str) -> &'a SubjectGrade {
    grades
        .iter()
        .find(|g| g.subject == subject)
        .unwrap_or_else(|| panic!("no row for {subject}"))
}

#[test]
fn schedule_page_parses_into_week() {
    let schedule = portal_core::parse_schedule(&fixture("schedule.html"));

    let monday: Vec<_> = schedule
        .day(0)
        .iter()
        .map(|b| (b.subject.as_str(), b.start.as_deref(), b.end.as_deref()))
        .collect();
    assert_eq!(
        monday,
        vec![
            ("Prog. Orientada a Objetos", Some("19:00"), Some("20:40")),
            ("Redes de Computadores", Some("20:50"), Some("22:30")),
        ]
    );

    let tuesday = schedule.for_weekday(Weekday::Tue);
    assert_eq!(tuesday.len(), 1);
    assert_eq!(tuesday[0].subject, "Engenharia de Software");
    assert_eq!(tuesday[0].instructor.as_deref(), Some("Lucas Parizotto"));
    assert_eq!(tuesday[0].start.as_deref(), Some("19:00"));
    assert_eq!(tuesday[0].end.as_deref(), Some("22:30"));

    assert!(schedule.day(2).is_empty());

    let thursday: Vec<_> = schedule.day(3).iter().map(|b| b.subject.as_str()).collect();
    assert_eq!(thursday, vec!["Ativ. Extensão IV", "Tópicos Integradores I"]);

    let saturday = schedule.for_weekday(Weekday::Sat);
    assert_eq!(saturday.len(), 1);
    assert!(saturday[0].is_variable());
    assert_eq!(saturday[0].instructor, None);

    assert!(schedule.for_weekday(Weekday::Sun).is_empty());
    assert_eq!(schedule.total_blocks(), 7);
}

#[test]
fn schedule_parsing_is_idempotent() {
    let html = fixture("schedule.html");
    let parser = ScheduleParser::default();
    assert_eq!(parser.parse(&html), parser.parse(&html));
}

#[test]
fn schedule_serializes_by_weekday_index() {
    let schedule = portal_core::parse_schedule(&fixture("schedule.html"));
    let json = serde_json::to_value(&schedule).unwrap();

    assert_eq!(json["0"][0]["subject"], "Prog. Orientada a Objetos");
    assert!(json["5"][0]["start"].is_null());
}

#[test]
fn login_page_has_no_tables() {
    let html = fixture("login.html");

    assert_eq!(portal_core::parse_grades(&html), TableOutcome::Missing);
    assert!(portal_core::parse_schedule(&html).is_empty());
}

#[test]
fn empty_results_table_is_not_missing() {
    assert_eq!(
        portal_core::parse_grades(&fixture("grades_empty.html")),
        TableOutcome::Parsed(Vec::new())
    );
}

#[test]
fn results_page_parses_every_subject() {
    let before = grades("grades_before.html");
    assert_eq!(before.len(), 5);

    let redes = find(&before, "Redes de Computadores");
    assert_eq!(redes.code, "10452");
    assert_eq!((redes.n1, redes.n2, redes.n3), (Some(7.0), None, None));
    assert_eq!((redes.absences, redes.absence_ceiling), (2, 20));

    let eng = find(&before, "Engenharia de Software");
    assert_eq!((eng.n1, eng.n2, eng.n3), (None, None, None));
    assert_eq!(eng.semester_average, Some(0.0));

    let fisica = find(&before, "Física Geral e Experimental");
    assert_eq!(fisica.semester_average, Some(4.0));
    assert_eq!(fisica.final_average, None);
}

#[test]
fn results_parsing_is_idempotent() {
    let html = fixture("grades_after.html");
    let parser = GradeParser::default();
    assert_eq!(parser.parse(&html), parser.parse(&html));
}

#[test]
fn simulation_over_results_page() {
    let before = grades("grades_before.html");
    let simulator = Simulator::default();

    match simulator.simulate(find(&before, "Redes de Computadores")) {
        SimulationVerdict::NeedsMinimumScore {
            threshold, missing, ..
        } => {
            assert_eq!(threshold, 5.5);
            assert_eq!(missing, vec![ScoreLabel::N2, ScoreLabel::N3]);
        }
        other => panic!("unexpected verdict {other:?}"),
    }

    // MS 0.0 with no partial scores is the "not yet computed" sentinel
    match simulator.simulate(find(&before, "Engenharia de Software")) {
        SimulationVerdict::NeedsMinimumScore {
            threshold, missing, ..
        } => {
            assert_eq!(threshold, 6.0);
            assert_eq!(missing.len(), 3);
        }
        other => panic!("unexpected verdict {other:?}"),
    }

    let fisica = simulator.simulate(find(&before, "Física Geral e Experimental"));
    assert!(matches!(
        fisica,
        SimulationVerdict::NeedsRemedial { threshold, estimated: false, .. } if threshold == 6.0
    ));

    let poo = simulator.simulate(find(&before, "Prog. Orientada a Objetos"));
    assert_eq!(poo.status(), "already_secured");

    let topicos = simulator.simulate(find(&before, "Tópicos Integradores I"));
    assert_eq!(topicos.status(), "failed_by_absence");
    assert!(topicos.is_failed());
}

#[test]
fn posted_score_end_to_end() {
    let before = grades("grades_before.html");
    let after = grades("grades_after.html");

    let deltas = portal_core::diff(&before, &after);
    assert_eq!(
        deltas,
        vec![
            GradeDelta {
                subject: "Redes de Computadores".into(),
                changes: vec![FieldChange {
                    field: GradeField::N2,
                    old: None,
                    new: Some(5.0),
                }],
            },
            GradeDelta {
                subject: "Física Geral e Experimental".into(),
                changes: vec![FieldChange {
                    field: GradeField::FinalAverage,
                    old: None,
                    new: Some(5.5),
                }],
            },
            GradeDelta {
                subject: "Prog. Orientada a Objetos".into(),
                changes: vec![FieldChange {
                    field: GradeField::Absences,
                    old: Some(1.0),
                    new: Some(3.0),
                }],
            },
        ]
    );

    match portal_core::simulate(find(&after, "Redes de Computadores")) {
        SimulationVerdict::NeedsMinimumScore {
            threshold, missing, ..
        } => {
            assert_eq!(threshold, 6.0);
            assert_eq!(missing, vec![ScoreLabel::N3]);
        }
        other => panic!("unexpected verdict {other:?}"),
    }

    assert!(portal_core::simulate(find(&after, "Física Geral e Experimental")).is_passing());
}

#[test]
fn diff_of_identical_snapshots_is_empty() {
    let after = grades("grades_after.html");
    assert!(portal_core::diff(&after, &after).is_empty());
}

#[test]
fn custom_config_drives_parsers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[grades]
table_selector = "table.Notas"

[policy]
semester_pass = 7.0
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    config.validate().unwrap();

    let parser = GradeParser::new(&config.grades).unwrap();
    assert!(parser.parse(&fixture("grades_before.html")).is_missing());

    let html = fixture("grades_after.html").replace("table class=\"Boletim\"", "table class=\"Notas\"");
    let after = parser.parse(&html).parsed().unwrap();

    let verdict = Simulator::new(config.policy).simulate(find(&after, "Redes de Computadores"));
    assert!(matches!(
        verdict,
        SimulationVerdict::NeedsMinimumScore { threshold, .. } if threshold == 9.0
    ));
}
