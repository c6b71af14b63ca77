//! Template-driven generation from YAML fixtures.

use corpus_gen::{
    Config, EngineGenerator, FieldSource, Fields, GenState, Generator, GeneratorError,
    JinjaEngine, TemplateGenerator,
};
use std::io::Write;

const SEED: u64 = 42;

type EngineResult = Result<(), GeneratorError>;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("corpus_generator=debug")
        .try_init()
        .ok();
}

fn vpc_inputs() -> (Config, Fields) {
    let fields = Fields::from_file("tests/fixtures/vpc_flow_fields.yaml")
        .expect("Failed to load VPC flow fields");
    let config = Config::from_file("tests/fixtures/vpc_flow_config.yaml")
        .expect("Failed to load VPC flow config");
    (config, fields)
}

fn emit_lines(generator: &dyn Generator, count: usize) -> Vec<String> {
    let mut state = GenState::with_seed(SEED);
    (0..count)
        .map(|_| {
            let mut buf = Vec::new();
            generator.emit(&mut state, &mut buf).unwrap();
            String::from_utf8(buf).unwrap()
        })
        .collect()
}

#[test]
fn test_vpc_flow_log_lines() {
    init_tracing();
    let (config, fields) = vpc_inputs();
    let template = std::fs::read("tests/fixtures/vpc_flow.tpl").unwrap();
    let generator = TemplateGenerator::new(&template, &config, &fields).unwrap();

    for line in emit_lines(&generator, 200) {
        let parts: Vec<&str> = line.split(' ').collect();
        assert_eq!(parts.len(), 14, "{line}");
        assert_eq!(parts[0], "2");
        assert_eq!(parts[1], "627286350134");
        assert_eq!(parts[2].split('-').count(), 2);
        assert_eq!(parts[3].split('.').count(), 4);
        assert!(parts[5].parse::<u32>().unwrap() < 65535);
        assert!(parts[10].ends_with('Z'));
        assert!(parts[12] == "ACCEPT" || parts[12] == "REJECT");
        assert!(parts[13] == "NODATA" || parts[13] == "OK");
    }
}

#[test]
fn test_json_shaped_template() {
    let (config, fields) = vpc_inputs();
    let generator = TemplateGenerator::new(
        br#"{"version":{{.Version}},"src":"{{.SrcAddr}}","port":{{.DstPort}}}"#,
        &config,
        &fields,
    )
    .unwrap();

    for line in emit_lines(&generator, 50) {
        let record: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(record["version"], 2);
        assert!(record["port"].as_i64().unwrap() < 65535);
    }
}

#[test]
fn test_unknown_template_field() {
    let (config, fields) = vpc_inputs();
    let result = TemplateGenerator::new(b"{{.Version}} {{.Missing}}", &config, &fields);
    assert!(matches!(result, Err(GeneratorError::UnknownField(name)) if name == "Missing"));
}

#[test]
fn test_engine_adapter() {
    init_tracing();
    let (config, fields) = vpc_inputs();
    let columns = ["Version", "SrcAddr", "DstPort", "Action"];

    let engine = move |source: &mut FieldSource<'_>, out: &mut Vec<u8>| -> EngineResult {
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                out.push(b',');
            }
            let value = source.generate(column)?;
            write!(out, "{value}")?;
        }
        Ok(())
    };
    let generator = EngineGenerator::new(engine, &config, &fields).unwrap();

    for line in emit_lines(&generator, 50) {
        let parts: Vec<&str> = line.split(',').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "2");
        assert!(parts[3] == "ACCEPT" || parts[3] == "REJECT");
    }
}

#[test]
fn test_jinja_flow_log_lines() {
    init_tracing();
    let (config, fields) = vpc_inputs();
    let template = std::fs::read_to_string("tests/fixtures/vpc_flow.jinja").unwrap();
    let engine = JinjaEngine::new(template).unwrap();
    let generator = EngineGenerator::new(engine, &config, &fields).unwrap();

    let mut statuses = std::collections::HashSet::new();
    for line in emit_lines(&generator, 200) {
        let parts: Vec<&str> = line.split(' ').collect();
        assert_eq!(parts.len(), 9, "{line}");
        assert_eq!(parts[0], "2");
        assert_eq!(parts[1], "627286350134");
        assert!(parts[7] == "ACCEPT" || parts[7] == "REJECT");

        match parts[8] {
            "OK" => {
                parts[5].parse::<u64>().unwrap();
                parts[6].parse::<u64>().unwrap();
            }
            "NODATA" => assert_eq!(&parts[5..7], &["-", "-"]),
            other => panic!("unexpected log status {other}"),
        }
        statuses.insert(parts[8].to_string());
    }
    assert_eq!(statuses.len(), 2);
}
