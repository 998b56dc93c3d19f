use xcmatrix::core::command::build_command;
use xcmatrix::core::config::{Configuration, KeyValues, Overrides, RedirectStderr, Sdk};
use xcmatrix::core::destination::{Destination, DestinationSpec};
use xcmatrix::core::subtask::Subtask;

fn base() -> Configuration {
    let mut config = Configuration::new();
    config.set_workspace("W");
    config.xcodebuild_path = "xcodebuild".into();
    config.xctool_path = "xctool".into();
    config
}

#[test]
fn test_unversioned_xcodebuild_command() {
    let subtask = Subtask::with_scheme("unit", "S", &base()).unwrap();
    let commands = subtask.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(
        commands[0].1,
        "xcodebuild -workspace W -scheme 'S' -sdk iphonesimulator clean build test"
    );
}

#[test]
fn test_versioned_xctool_commands() {
    let mut config = base();
    config.set_runner("xctool").unwrap();
    let overrides = Overrides {
        scheme: Some("S".to_string()),
        ios_versions: Some(vec!["7.0".to_string(), "7.1".to_string()]),
        ..Overrides::default()
    };
    let subtask = Subtask::new("unit", &config, &overrides).unwrap();
    let commands: Vec<String> = subtask.commands().into_iter().map(|(_, c)| c).collect();

    assert_eq!(
        commands,
        vec![
            "xctool -workspace W -scheme 'S' -sdk iphonesimulator7.0 clean build test -freshSimulator",
            "xctool -workspace W -scheme 'S' -sdk iphonesimulator7.1 clean build test -freshSimulator",
        ]
    );
}

#[test]
fn test_xcpretty_with_output_log_tees_before_formatting() {
    let mut config = base();
    config.set_runner("xcpretty -s").unwrap();
    config.scheme = Some("S".to_string());
    config.output_log = Some("build/xcodebuild.log".into());

    let command = build_command(&config, None);
    assert_eq!(
        command,
        "xcodebuild -workspace W -scheme 'S' -sdk iphonesimulator clean build test | tee -a build/xcodebuild.log | xcpretty -s ; exit ${PIPESTATUS[0]}"
    );
    let tee = command.find("| tee").unwrap();
    let wrapper = command.find("| xcpretty").unwrap();
    assert!(tee < wrapper);
}

#[test]
fn test_custom_xcodebuild_string_replaces_the_path() {
    let mut config = base();
    config.set_runner("xcodebuild -quiet").unwrap();
    config.scheme = Some("S".to_string());
    assert!(build_command(&config, None).starts_with("xcodebuild -quiet -workspace W"));
}

#[test]
fn test_destinations_are_rendered_in_order() {
    let mut config = base();
    config.scheme = Some("S".to_string());
    config.destinations = vec![
        Destination::Structured(
            DestinationSpec::new()
                .platform("iossimulator")
                .unwrap()
                .name("iPad Retina")
                .os("latest"),
        ),
        Destination::quoted("platform=iOS Simulator,OS=7.1,name=iPhone Retina (4-inch)").unwrap(),
    ];

    let command = build_command(&config, None);
    assert!(command.contains(
        "-destination platform='iOS Simulator',name='iPad Retina',OS='latest' -destination "
    ));

    // The shell sees each destination as a single word.
    let words = shlex::split(&command).unwrap();
    assert_eq!(
        words,
        vec![
            "xcodebuild",
            "-workspace",
            "W",
            "-scheme",
            "S",
            "-sdk",
            "iphonesimulator",
            "-destination",
            "platform=iOS Simulator,name=iPad Retina,OS=latest",
            "-destination",
            "platform=iOS Simulator,OS=7.1,name=iPhone Retina (4-inch)",
            "clean",
            "build",
            "test",
        ]
    );
}

#[test]
fn test_inherited_settings_are_merged() {
    let mut config = base();
    config.settings.insert("ONLY_ACTIVE_ARCH", "NO");
    let settings: KeyValues = [("ONLY_ACTIVE_ARCH", "YES"), ("CI", "1")].into_iter().collect();
    let overrides = Overrides {
        scheme: Some("S".to_string()),
        settings,
        ..Overrides::default()
    };
    let subtask = Subtask::new("unit", &config, &overrides).unwrap();
    assert!(subtask.commands()[0].1.ends_with("clean build test ONLY_ACTIVE_ARCH=YES CI=1"));
}

fn layerkit() -> Configuration {
    let mut config = Configuration::new();
    config.set_workspace("LayerKit.xcworkspace");
    config.scheme = Some("Unit Tests".to_string());
    config
}

#[test]
fn test_xcodebuild_default_path() {
    assert_eq!(
        build_command(&layerkit(), None),
        "/usr/bin/xcodebuild -workspace LayerKit.xcworkspace -scheme 'Unit Tests' -sdk iphonesimulator clean build test"
    );
}

#[test]
fn test_xctool_versioned_uses_fresh_simulator() {
    let mut config = layerkit();
    config.set_runner("xctool").unwrap();
    assert_eq!(
        build_command(&config, Some("7.1")),
        "/usr/local/bin/xctool -workspace LayerKit.xcworkspace -scheme 'Unit Tests' -sdk iphonesimulator7.1 clean build test -freshSimulator"
    );
    // Unversioned xctool runs never request a fresh simulator.
    assert!(!build_command(&config, None).contains("-freshSimulator"));
}

#[test]
fn test_xctool_custom_string_is_the_prefix() {
    let mut config = layerkit();
    config.set_runner("xctool -reporter pretty").unwrap();
    assert!(build_command(&config, None).starts_with(
        "xctool -reporter pretty -workspace LayerKit.xcworkspace"
    ));
}

#[test]
fn test_xcpretty_default_wrapper() {
    let mut config = layerkit();
    config.set_runner("xcpretty").unwrap();
    assert_eq!(
        build_command(&config, None),
        "/usr/bin/xcodebuild -workspace LayerKit.xcworkspace -scheme 'Unit Tests' -sdk iphonesimulator clean build test | xcpretty -c ; exit ${PIPESTATUS[0]}"
    );
}

#[test]
fn test_project_target_and_macosx() {
    let mut config = layerkit();
    config.set_project("App.xcodeproj");
    config.sdk = Sdk::MacOsx;
    assert_eq!(
        build_command(&config, None),
        "/usr/bin/xcodebuild -project App.xcodeproj -scheme 'Unit Tests' -sdk macosx clean build test"
    );
}

#[test]
fn test_stderr_redirection_comes_last() {
    let mut config = layerkit();
    config.redirect_stderr = Some(RedirectStderr::Discard);
    config.output_log = Some("output.log".into());
    let command = build_command(&config, None);
    assert!(command.ends_with("| tee -a output.log 2> /dev/null"));

    config.redirect_stderr = Some(RedirectStderr::Path("errors.log".into()));
    assert!(build_command(&config, None).ends_with("2> errors.log"));
}

#[test]
fn test_settings_and_custom_actions() {
    let mut config = layerkit();
    config.actions = vec!["test".to_string()];
    config.settings.insert("GCC_PREPROCESSOR_DEFINITIONS", "CI=1");
    config.settings.insert("ONLY_ACTIVE_ARCH", "NO");
    assert_eq!(
        build_command(&config, None),
        "/usr/bin/xcodebuild -workspace LayerKit.xcworkspace -scheme 'Unit Tests' -sdk iphonesimulator test GCC_PREPROCESSOR_DEFINITIONS=CI=1 ONLY_ACTIVE_ARCH=NO"
    );
}

#[test]
fn test_paths_with_spaces_stay_single_shell_words() {
    let mut config = Configuration::new();
    config.set_workspace("/Users/me/My App.xcworkspace");
    config.scheme = Some("Unit Tests".to_string());
    config.xcodebuild_path = "/Applications/Xcode Beta.app/usr/bin/xcodebuild".into();
    config.output_log = Some("/tmp/build logs/x.log".into());
    config.redirect_stderr = Some(RedirectStderr::Path("/tmp/build logs/err.log".into()));

    let words = shlex::split(&build_command(&config, None)).unwrap();
    assert_eq!(words[0], "/Applications/Xcode Beta.app/usr/bin/xcodebuild");
    let workspace = words.iter().position(|w| w == "-workspace").unwrap();
    assert_eq!(words[workspace + 1], "/Users/me/My App.xcworkspace");
    let tee = words.iter().position(|w| w == "tee").unwrap();
    assert_eq!(&words[tee + 1..tee + 3], ["-a", "/tmp/build logs/x.log"]);
    assert_eq!(&words[words.len() - 2..], ["2>", "/tmp/build logs/err.log"]);
}
