//! End-to-end weaving of a disassembled sample module.

use std::{fs, path::Path};

use ilweave::{prelude::*, file::read_listing};

const SAMPLE: &str = "tests/samples/Calculator.il";

fn method_text<'a>(woven: &'a str, qualified: &str) -> &'a str {
    let closing = format!("// end of method {qualified}");
    let end = woven
        .find(&closing)
        .unwrap_or_else(|| panic!("method {qualified} not found"));
    let start = woven[..end].rfind(".method").unwrap();
    &woven[start..end + closing.len()]
}

fn woven_sample() -> (String, String) {
    let listing = read_listing(SAMPLE).unwrap();
    let woven = Weaver::default().weave(&listing).unwrap();
    (listing, woven)
}

#[test]
fn parameter_logging_with_sequences() {
    let (_, woven) = woven_sample();
    let sum = method_text(&woven, "Calculator::Sum");

    assert!(sum.contains("    .maxstack  5"));
    assert!(sum.contains("    .locals init ([0] string V_0,"));
    assert!(sum.contains("             [1] int32 total,"));
    assert!(sum.contains("             [3] int32 V_3)"));
    assert!(sum.contains("ldstr      \"values=\""));
    assert!(sum.contains("ldstr      \"; label=\""));
    assert!(sum.contains("call       string Demo.Calculator::WeaveSequenceToStringStatic(object, bool)"));
    assert!(sum.contains("call       string [System.Runtime]System.Convert::ToString(object)"));
    assert!(sum.contains("call       string [System.Runtime]System.String::Concat(string[])"));

    // Original locals moved up by one slot
    assert!(sum.contains("    IL_0002:  stloc.1"));
    assert!(sum.contains("    IL_0010:  stloc.2"));
    assert!(sum.contains("    IL_0018:  stloc.3"));
    assert!(sum.contains("    IL_001b:  ldloc.3"));

    // Short branches widened, targets kept
    assert!(sum.contains("    IL_0005:  br         IL_0011"));
    assert!(sum.contains("    IL_0015:  blt        IL_0007"));

    // Exit block takes over the return label; parameters only, so no elapsed time
    assert!(sum.contains("    IL_001c:  ldstr      \"Sum\""));
    assert!(sum.contains("ldc.i8     -1"));
    assert!(sum.contains("call       void Demo.Log::Report(string, string, int64)"));
    assert!(!sum.contains("Stopwatch"));
}

#[test]
fn method_override_and_boxing() {
    let (_, woven) = woven_sample();
    let describe = method_text(&woven, "Calculator::Describe");

    assert!(describe.contains("    .locals init ([0] string V_0,"));
    assert!(describe.contains("[1] class [System.Runtime.Extensions]System.Diagnostics.Stopwatch V_1)"));
    assert!(describe.contains("ldarg.1"));
    assert!(describe.contains("box        valuetype Demo.Point"));
    assert!(describe.contains("ldarga.s   2"));
    assert!(describe.contains("call       instance string [System.Runtime]System.Double::ToString()"));
    assert!(describe.contains("::StartNew()"));
    assert!(describe.contains("    IL_0001:  ldloc.1"));
    assert!(describe.contains("::get_ElapsedMilliseconds()"));

    let put = method_text(&woven, "Box`1::Put");
    assert!(put.contains("box        !T"));
    assert!(put.contains("ldstr      \"item=\""));
}

#[test]
fn untouched_parts() {
    let (listing, woven) = woven_sample();

    for qualified in ["Log::Report", "Calculator::.ctor"] {
        assert_eq!(
            method_text(&woven, qualified),
            method_text(&listing, qualified)
        );
    }
    assert!(woven.contains("// *********** DISASSEMBLY COMPLETE ***********************"));

    let reference = woven
        .find(".assembly extern System.Runtime.Extensions")
        .unwrap();
    assert!(reference < woven.find(".assembly Calculator").unwrap());

    let helpers = woven
        .lines()
        .filter(|line| line.contains(".method private hidebysig"))
        .count();
    assert_eq!(helpers, 1);
    assert!(!woven.contains("***START") && !woven.contains("***END"));
}

#[test]
fn utf16_listing() {
    let listing = fs::read_to_string(SAMPLE).unwrap();
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(listing.encode_utf16().flat_map(u16::to_le_bytes));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Calculator.il");
    fs::write(&path, bytes).unwrap();

    let decoded = read_listing(&path).unwrap();
    assert_eq!(decoded, listing);

    let weaver = Weaver::default();
    assert_eq!(
        weaver.weave(&decoded).unwrap(),
        weaver.weave(&listing).unwrap()
    );
}

#[test]
fn crlf_listing_keeps_line_endings() {
    let listing = read_listing(SAMPLE).unwrap();
    let crlf = listing.replace("\r\n", "\n").replace('\n', "\r\n");

    let weaver = Weaver::default();
    let woven = weaver.weave(&crlf).unwrap();
    assert_eq!(woven.matches('\n').count(), woven.matches("\r\n").count());
    assert!(woven.ends_with("\r\n"));
    assert_eq!(
        method_text(&woven, "Log::Report"),
        method_text(&crlf, "Log::Report")
    );

    let lf = weaver.weave(&listing.replace("\r\n", "\n")).unwrap();
    assert_eq!(woven, lf.replace('\n', "\r\n"));
}

#[test]
fn strict_and_lenient_modes() {
    let listing = read_listing(SAMPLE).unwrap();
    let unknown = listing.replacen("54 79 70 65 00 00 00 00", "54 79 70 65 07 00 00 00", 1);
    assert_ne!(unknown, listing);

    assert!(matches!(
        Weaver::default().weave(&unknown),
        Err(Error::UnknownLoggingMode(7))
    ));

    let lenient = Weaver::new(WeaveConfig::default().with_strictness(Strictness::Lenient));
    let woven = lenient.weave(&unknown).unwrap();
    assert!(method_text(&woven, "Calculator::Sum").contains("values="));
}

#[test]
fn batch_and_render_rules() {
    let listing = read_listing(SAMPLE).unwrap();
    let weaver = Weaver::new(WeaveConfig::default().with_max_sequence_items(2));
    let results = weaver.weave_many(&[listing.as_str(), "", listing.as_str()]);

    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Error::Empty)));
    assert_eq!(results[0].as_ref().unwrap(), results[2].as_ref().unwrap());
    assert_ne!(
        results[0].as_ref().unwrap(),
        &Weaver::default().weave(&listing).unwrap()
    );

    let format = SequenceFormat::from_config(weaver.config());
    assert_eq!(format.render(Some([1, 2, 3]), true), "[1, 2, ...]");
}

#[test]
fn sample_exists() {
    assert!(Path::new(SAMPLE).exists());
}
