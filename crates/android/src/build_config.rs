//! Android build configuration
//!
//! Validation of the app's build values and rendering of the matching
//! `build.gradle.kts` for the app module. The rendered script loads
//! `key.properties` when present and always wires the `release` signing
//! config into the release build type.

use dersplan_core::config::{AndroidConfig, AppConfig};
use dersplan_core::validation::{ValidationResult, Validator};

/// Lowest API level Flutter still supports
pub const FLUTTER_MIN_SDK: u32 = 21;

/// Dotted Java package name, at least two segments
const PACKAGE_NAME_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9_]*(\.[a-zA-Z][a-zA-Z0-9_]*)+$";

/// Gradle configuration names are emitted as bare Kotlin calls
const CONFIGURATION_PATTERN: &str = r"^[a-zA-Z_][a-zA-Z0-9_]*$";

/// Validate application build values
pub fn validate_app_config(app: &AppConfig) -> ValidationResult {
    let mut validator = Validator::new()
        .pattern("namespace", &app.namespace, PACKAGE_NAME_PATTERN, "a Java package name")
        .pattern(
            "application_id",
            &app.application_id,
            PACKAGE_NAME_PATTERN,
            "a Java package name",
        )
        .range("min_sdk", app.min_sdk, FLUTTER_MIN_SDK, app.compile_sdk.max(FLUTTER_MIN_SDK))
        .ordered("min_sdk", app.min_sdk, "target_sdk", app.target_sdk)
        .ordered("target_sdk", app.target_sdk, "compile_sdk", app.compile_sdk)
        .range("version_code", app.version_code, 1, 2_100_000_000)
        .required("version_name", &app.version_name)
        .semver("version_name", &app.version_name)
        .range("java_version", app.java_version, 8, 21)
        .required("ndk_version", &app.ndk_version)
        .warn_if(
            "release.minify_enabled",
            !app.release.minify_enabled,
            "Release builds are not minified",
        );

    for (index, dep) in app.dependencies.iter().enumerate() {
        let field = format!("dependencies[{}]", index);
        validator = validator
            .pattern(&field, &dep.configuration, CONFIGURATION_PATTERN, "a Gradle configuration name")
            .custom(&field, || {
                let parts: Vec<&str> = dep.notation.split(':').collect();
                if parts.len() == 3 && parts.iter().all(|p| !p.trim().is_empty()) {
                    None
                } else {
                    Some(format!("Expected group:artifact:version, got '{}'", dep.notation))
                }
            });
    }

    if app.core_library_desugaring
        && !app
            .dependencies
            .iter()
            .any(|d| d.configuration == "coreLibraryDesugaring")
    {
        validator = validator.custom("core_library_desugaring", || {
            Some("Desugaring is enabled but no coreLibraryDesugaring dependency is declared".to_string())
        });
    }

    validator.validate()
}

/// Quote a value as a Kotlin string literal
fn kotlin_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '$' => quoted.push_str("\\$"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Render the app module's `build.gradle.kts`
pub fn render_gradle_kts(android: &AndroidConfig, app: &AppConfig) -> String {
    let java = format!("JavaVersion.VERSION_{}", app.java_version);

    let proguard = if app.release.proguard_files.is_empty() {
        String::new()
    } else {
        let files: Vec<String> = app
            .release
            .proguard_files
            .iter()
            .enumerate()
            .map(|(i, f)| {
                // First entry names the SDK's bundled default rules.
                if i == 0 && f.starts_with("proguard-android") {
                    format!("getDefaultProguardFile({})", kotlin_string(f))
                } else {
                    kotlin_string(f)
                }
            })
            .collect();
        format!("\n            proguardFiles({})", files.join(", "))
    };

    let mut script = format!(
        r#"import java.io.FileInputStream
import java.util.Properties

plugins {{
    id("com.android.application")
    id("kotlin-android")
    id("dev.flutter.flutter-gradle-plugin")
}}

val keystoreProperties = Properties()
val keystorePropertiesFile = rootProject.file({key_properties})
if (keystorePropertiesFile.exists()) {{
    keystoreProperties.load(FileInputStream(keystorePropertiesFile))
}}

android {{
    namespace = {namespace}
    compileSdk = {compile_sdk}
    ndkVersion = {ndk_version}

    compileOptions {{
        sourceCompatibility = {java}
        targetCompatibility = {java}
        isCoreLibraryDesugaringEnabled = {desugaring}
    }}

    kotlinOptions {{
        jvmTarget = {java}.toString()
    }}

    defaultConfig {{
        applicationId = {application_id}
        minSdk = {min_sdk}
        targetSdk = {target_sdk}
        versionCode = {version_code}
        versionName = {version_name}
        multiDexEnabled = {multi_dex}
    }}

    signingConfigs {{
        create("release") {{
            keyAlias = keystoreProperties["keyAlias"] as String?
            keyPassword = keystoreProperties["keyPassword"] as String?
            storeFile = keystoreProperties["storeFile"]?.let {{ file(it) }}
            storePassword = keystoreProperties["storePassword"] as String?
        }}
    }}

    buildTypes {{
        release {{
            signingConfig = signingConfigs.getByName("release")
            isMinifyEnabled = {minify}{proguard}
        }}
    }}
}}

flutter {{
    source = {flutter_source}
}}
"#,
        key_properties = kotlin_string(&android.key_properties),
        namespace = kotlin_string(&app.namespace),
        compile_sdk = app.compile_sdk,
        ndk_version = kotlin_string(&app.ndk_version),
        java = java,
        desugaring = app.core_library_desugaring,
        application_id = kotlin_string(&app.application_id),
        min_sdk = app.min_sdk,
        target_sdk = app.target_sdk,
        version_code = app.version_code,
        version_name = kotlin_string(&app.version_name),
        multi_dex = app.multi_dex_enabled,
        minify = app.release.minify_enabled,
        proguard = proguard,
        flutter_source = kotlin_string(&app.flutter_source),
    );

    if !app.dependencies.is_empty() {
        script.push_str("\ndependencies {\n");
        for dep in &app.dependencies {
            script.push_str(&format!("    {}({})\n", dep.configuration, kotlin_string(&dep.notation)));
        }
        script.push_str("}\n");
    }

    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use dersplan_core::config::DependencyConfig;

    #[test]
    fn test_default_config_is_valid() {
        let result = validate_app_config(&AppConfig::default());
        assert!(result.is_valid(), "{:?}", result.errors());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_min_sdk_above_target_sdk_fails() {
        let app = AppConfig {
            min_sdk: 35,
            target_sdk: 34,
            ..AppConfig::default()
        };
        let result = validate_app_config(&app);
        assert!(result.errors().iter().any(|e| e.field == "min_sdk" && e.code == "ORDER"));
    }

    #[test]
    fn test_target_sdk_above_compile_sdk_fails() {
        let app = AppConfig {
            target_sdk: 36,
            ..AppConfig::default()
        };
        let result = validate_app_config(&app);
        assert!(result.errors().iter().any(|e| e.field == "target_sdk"));
    }

    #[test]
    fn test_bad_identifiers_and_version() {
        let app = AppConfig {
            application_id: "dersplanlayici".to_string(),
            version_name: "v1".to_string(),
            version_code: 0,
            ..AppConfig::default()
        };
        let result = validate_app_config(&app);
        let fields: Vec<&str> = result.errors().iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"application_id"));
        assert!(fields.contains(&"version_name"));
        assert!(fields.contains(&"version_code"));
    }

    #[test]
    fn test_desugaring_requires_dependency() {
        let app = AppConfig {
            dependencies: vec![DependencyConfig::new("implementation", "androidx.window:window:1.0.0")],
            ..AppConfig::default()
        };
        let result = validate_app_config(&app);
        assert!(result.errors().iter().any(|e| e.field == "core_library_desugaring"));
    }

    #[test]
    fn test_malformed_dependency_notation() {
        let mut app = AppConfig::default();
        app.dependencies.push(DependencyConfig::new("implementation", "androidx.window"));
        let result = validate_app_config(&app);
        assert!(result.errors().iter().any(|e| e.field == "dependencies[3]"));
    }

    #[test]
    fn test_dependency_configuration_must_be_identifier() {
        let mut app = AppConfig::default();
        app.dependencies.push(DependencyConfig::new("implementation(\"x\")", "a:b:1"));
        let result = validate_app_config(&app);
        assert!(result.errors().iter().any(|e| e.field == "dependencies[3]" && e.code == "PATTERN"));
    }

    #[test]
    fn test_render_escapes_string_literals() {
        let android = AndroidConfig {
            key_properties: "secrets/\"key\".properties".to_string(),
            ..AndroidConfig::default()
        };
        let mut app = AppConfig {
            ndk_version: "27\\0\"".to_string(),
            flutter_source: "$HOME/app".to_string(),
            ..AppConfig::default()
        };
        app.dependencies = vec![DependencyConfig::new("implementation", "a:b:\"1\"")];

        let script = render_gradle_kts(&android, &app);
        assert!(script.contains(r#"rootProject.file("secrets/\"key\".properties")"#));
        assert!(script.contains(r#"ndkVersion = "27\\0\"""#));
        assert!(script.contains(r#"source = "\$HOME/app""#));
        assert!(script.contains(r#"implementation("a:b:\"1\"")"#));
    }

    #[test]
    fn test_unminified_release_warns() {
        let mut app = AppConfig::default();
        app.release.minify_enabled = false;
        let result = validate_app_config(&app);
        assert!(result.is_valid());
        assert_eq!(result.warnings()[0].field, "release.minify_enabled");
    }

    #[test]
    fn test_render_gradle_kts() {
        let script = render_gradle_kts(&AndroidConfig::default(), &AppConfig::default());

        assert!(script.contains("rootProject.file(\"key.properties\")"));
        assert!(script.contains("namespace = \"com.raijumounun.dersplanlayici\""));
        assert!(script.contains("compileSdk = 35"));
        assert!(script.contains("ndkVersion = \"27.0.12077973\""));
        assert!(script.contains("sourceCompatibility = JavaVersion.VERSION_11"));
        assert!(script.contains("minSdk = 21"));
        assert!(script.contains("versionName = \"1.0.0\""));
        assert!(script.contains("signingConfig = signingConfigs.getByName(\"release\")"));
        assert!(script.contains(
            "proguardFiles(getDefaultProguardFile(\"proguard-android-optimize.txt\"), \"proguard-rules.pro\")"
        ));
        assert!(script.contains("source = \"../..\""));
        assert!(script.contains("coreLibraryDesugaring(\"com.android.tools:desugar_jdk_libs:2.1.4\")"));
    }
}
