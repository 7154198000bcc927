use pathpost::codegen::{CodeGenerator, GenerateError};
use pathpost::dialect::DialectOverrides;
use pathpost::dialect::DialectConfig;
use pathpost::model::{Command, Machine, MachineUnits, PathNode};
use pathpost::output::{Destination, Review};
use pathpost::post::redeem::RedeemPost;
use pathpost::post::{PostProcessor, PostProcessorType};
use pathpost::validator::ValidationError;
use pathpost::{export, ExportError, Exporter};
use pretty_assertions::assert_eq;

const TIMESTAMP: &str = "2026-01-01 00:00:00";

fn profile() -> PathNode {
    PathNode::leaf(
        "Profile",
        vec![
            Command::new("G0").with("Z", 5.0),
            Command::new("M3").with("S", 1000.0),
            Command::new("G1").with("X", 10.0).with("Y", 20.0).with("F", 300.0),
            Command::new("M5"),
        ],
    )
}

fn project() -> Vec<PathNode> {
    vec![PathNode::group(
        "Project",
        vec![
            PathNode::machine_definition(Machine::new("Bench", MachineUnits::Imperial)),
            PathNode::placeholder("Stock"),
            profile(),
        ],
    )]
}

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

#[test]
fn test_shopbot_full_program() {
    let gcode = Exporter::new(PostProcessorType::ShopBot)
        .timestamp(TIMESTAMP)
        .export(&project(), &Destination::Discard)
        .unwrap();

    assert_eq!(
        lines(&gcode),
        vec![
            "(Exported by pathpost)",
            "(Post Processor: shopbot 0.0.2)",
            "(Output Time:2026-01-01 00:00:00)",
            "(begin preamble)",
            "G17",
            "G91",
            "G20",
            "(begin operation: Project)",
            "(compound: Project)",
            "(Path: Profile)",
            "G0 Z5.0000",
            "(set spindle speed)",
            "TR,1000,1",
            "(turn spindle on)",
            "SO,1,1",
            "PAUSE 1",
            "G1 X10.0000 Y20.0000 F300.00",
            "(turn spindle off)",
            "SO,1,0",
            "(finish operation: Project)",
            "(begin postamble)",
            "",
            "G00 X0.0 Y0.0",
            "G17",
            "G91",
            "M2",
        ]
    );
    assert!(gcode.ends_with("M2\n"));
}

#[test]
fn test_redeem_numbered_program() {
    let job = vec![PathNode::leaf(
        "Drill",
        vec![
            Command::new("M3").with("S", 5000.0),
            Command::new("G0").with("X", 1.0).with("Y", 1.0).with("F", 1000.0),
            Command::new("G1").with("Z", -2.0).with("F", 100.0),
            Command::new("M5"),
        ],
    )
    .with_machine(Machine::new("Replicape", MachineUnits::Metric))];

    let gcode = Exporter::new(PostProcessorType::Redeem)
        .args("--line-numbers --no-show-editor")
        .timestamp(TIMESTAMP)
        .export(&job, &Destination::Discard)
        .unwrap();

    assert_eq!(
        lines(&gcode),
        vec![
            "N110 (Exported by pathpost)",
            "N120 (Post Processor: redeem 0.0.2)",
            "N130 (Output Time:2026-01-01 00:00:00)",
            "N140 (begin preamble)",
            "N150 G17 G91",
            "N160 G21",
            "N170 (begin operation: Drill)",
            "(set spindle speed)",
            "N180 (spindle speed 5000 ignored)",
            "(turn spindle on)",
            "N190 M280 S-90 P0 F3000 R",
            "N200 G4 S1",
            "N210 M280 S90 P0 F3000 R",
            "N220 G4 S2",
            "N230 G0 X1.0000 Y1.0000",
            "N240 G1 Z-2.0000 F100.00",
            "(turn spindle off)",
            "N250 G4 S3",
            "N260 M280 S-90 P0 F3000 R",
            "N270 (finish operation: Drill)",
            "(begin postamble)",
            "N280 M05",
            "N290 G00 X0.0 Y0.0",
            "N300 G17 G91",
            "N310 M2",
        ]
    );
}

#[test]
fn test_line_numbers_strictly_increase() {
    let gcode = export(
        &project(),
        &Destination::Discard,
        "--line-numbers --no-comments",
        PostProcessorType::ShopBot,
    )
    .unwrap();

    let numbers: Vec<u32> = gcode
        .lines()
        .map(|l| {
            let word = l.split(' ').next().unwrap();
            word.strip_prefix('N').unwrap().parse().unwrap()
        })
        .collect();

    assert_eq!(numbers[0], 110);
    for pair in numbers.windows(2) {
        assert_eq!(pair[1], pair[0] + 10);
    }
}

#[test]
fn test_export_is_reproducible() {
    let run = || {
        Exporter::new(PostProcessorType::Redeem)
            .args("--no-show-editor --line-numbers")
            .timestamp(TIMESTAMP)
            .export(&project(), &Destination::Discard)
            .unwrap()
    };
    assert_eq!(run(), run());

    // Without a fixed timestamp only the header may differ
    let a = export(&project(), &"-".into(), "--no-header", PostProcessorType::ShopBot).unwrap();
    let b = export(&project(), &"-".into(), "--no-header", PostProcessorType::ShopBot).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_stock_leaves_render_nothing() {
    let config = DialectConfig {
        output_comments: false,
        ..RedeemPost.config()
    };
    let leaf = PathNode::leaf(
        "Profile",
        vec![Command::new("G1").with("X", 10.0).with("Y", 20.0).with("F", 300.0)],
    );

    let mut grouped = CodeGenerator::new(&RedeemPost, config.clone());
    grouped.render_node(&PathNode::group(
        "Job",
        vec![leaf.clone(), PathNode::placeholder("Stock")],
    ));

    let mut flat = CodeGenerator::new(&RedeemPost, config);
    flat.render_node(&leaf);

    assert_eq!(grouped.output(), flat.output());
    assert_eq!(flat.output().lines, vec!["G1 X10.0000 Y20.0000 F300.00"]);
}

#[test]
fn test_non_path_object_fails_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ngc");
    let job = vec![PathNode::placeholder("Stock"), profile()];

    let err = export(
        &job,
        &Destination::File(path.clone()),
        "",
        PostProcessorType::ShopBot,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ExportError::Validation(ValidationError::NotAPath { ref label }) if label == "Stock"
    ));
    assert!(!path.exists());
}

#[test]
fn test_line_number_overflow_fails_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ngc");
    let overrides: DialectOverrides =
        serde_json::from_str(r#"{ "line_start": 4294967290 }"#).unwrap();

    let err = Exporter::new(PostProcessorType::ShopBot)
        .overrides(overrides)
        .args("--line-numbers")
        .export(&project(), &Destination::File(path.clone()))
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::Generate(GenerateError::LineNumberOverflow { .. })
    ));
    assert!(!path.exists());
}

#[test]
fn test_missing_machine_uses_dialect_units() {
    let gcode = export(
        &[profile()],
        &Destination::Discard,
        "--no-header --no-comments",
        PostProcessorType::ShopBot,
    )
    .unwrap();
    assert_eq!(&lines(&gcode)[..3], &["G17", "G91", "G21"]);
}

#[test]
fn test_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ngc");

    let gcode = export(
        &project(),
        &Destination::File(path.clone()),
        "--no-header",
        PostProcessorType::ShopBot,
    )
    .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), gcode);
}

#[test]
fn test_review_write_policy_per_dialect() {
    let dir = tempfile::tempdir().unwrap();
    let mut edit = |text: &str| -> std::io::Result<Review> {
        Ok(Review::Accepted(format!("(reviewed)\n{}", text)))
    };

    // Redeem writes what the reviewer returned
    let redeem_path = dir.path().join("redeem.ngc");
    let returned = Exporter::new(PostProcessorType::Redeem)
        .args("--no-header")
        .reviewer(&mut edit)
        .export(&project(), &Destination::File(redeem_path.clone()))
        .unwrap();
    assert!(returned.starts_with("(reviewed)\n"));
    assert_eq!(std::fs::read_to_string(&redeem_path).unwrap(), returned);

    // ShopBot returns the edit but writes the rendered program
    let shopbot_path = dir.path().join("shopbot.ngc");
    let returned = Exporter::new(PostProcessorType::ShopBot)
        .args("--no-header --show-editor")
        .reviewer(&mut edit)
        .export(&project(), &Destination::File(shopbot_path.clone()))
        .unwrap();
    assert!(returned.starts_with("(reviewed)\n"));
    assert_eq!(
        std::fs::read_to_string(&shopbot_path).unwrap(),
        returned.trim_start_matches("(reviewed)\n")
    );
}

#[test]
fn test_reviewer_ignored_without_show_editor() {
    let mut edit = |_: &str| -> std::io::Result<Review> { Ok(Review::Accepted(String::new())) };
    let gcode = Exporter::new(PostProcessorType::Redeem)
        .args("--no-show-editor --no-header")
        .reviewer(&mut edit)
        .export(&project(), &Destination::Discard)
        .unwrap();
    assert!(gcode.contains("G1 X10.0000 Y20.0000 F300.00"));
}
