//! Built-in tag parsers.

mod api;
mod code;
mod example;
mod field;
mod model;
pub mod text;

pub use api::{Api, Define, Deprecated, Marker, NameRef, Private, SampleRequest, TextTag, VersionTag};
pub use code::{Code, CodeExample, CodeParam, See, TypedText};
pub use example::ExampleTag;
pub use field::FieldTag;
pub use model::Model;

use crate::registry::Registry;

/// Register every built-in tag. User parsers registered afterwards shadow these.
pub fn register_builtins(registry: &mut Registry) {
    // Endpoint family
    registry.register("api", Api);
    registry.register("apiName", TextTag::identifier("name"));
    registry.register("apiGroup", TextTag::identifier("group"));
    registry.register("apiDescription", TextTag::markdown("description", &["description"]));
    registry.register("apiVersion", VersionTag);
    registry.register("apiDefine", Define);
    registry.register("apiUse", NameRef::new("local.use", "@apiUse name"));
    registry.register("apiStructure", NameRef::new("local.structure", "@apiStructure name"));
    registry.register(
        "apiSuccessStructure",
        NameRef::new("local.successStructure", "@apiSuccessStructure name"),
    );
    registry.register("apiErrorStructure", NameRef::new("local.errorStructure", "@apiErrorStructure name"));
    registry.register(
        "apiHeaderStructure",
        NameRef::new("local.headerStructure", "@apiHeaderStructure name"),
    );
    registry.register("apiPermission", NameRef::new("local.permission", "@apiPermission name"));
    registry.register("apiSampleRequest", SampleRequest);
    registry.register("apiDeprecated", Deprecated);
    registry.register("apiPrivate", Private);
    registry.register("apiIgnore", Marker);

    registry.register(
        "apiParam",
        FieldTag::grouped("parameter", "Parameter", "@apiParam [(group)] [{type}] [field=defaultValue] [description]"),
    );
    registry.register(
        "apiSuccess",
        FieldTag::grouped("success", "Success 200", "@apiSuccess [(group)] [{type}] field [description]"),
    );
    registry.register(
        "apiError",
        FieldTag::grouped("error", "Error 4xx", "@apiError [(group)] [{type}] field [description]"),
    );
    registry.register(
        "apiHeader",
        FieldTag::grouped("header", "Header", "@apiHeader [(group)] [{type}] [field=defaultValue] [description]"),
    );
    registry.register(
        "apiQuery",
        FieldTag::flat("query", "Query", "@apiQuery [{type}] [field=defaultValue] [description]"),
    );
    registry.register(
        "apiBody",
        FieldTag::flat("body", "Body", "@apiBody [{type}] [field=defaultValue] [description]").with_checkbox(),
    );

    registry.register("apiExample", ExampleTag::new("local.examples"));
    registry.register("apiParamExample", ExampleTag::new("local.parameter.examples"));
    registry.register("apiSuccessExample", ExampleTag::new("local.success.examples"));
    registry.register("apiErrorExample", ExampleTag::new("local.error.examples"));
    registry.register("apiHeaderExample", ExampleTag::new("local.header.examples"));

    // Model family
    registry.register("model", Model);
    registry.register("modelName", TextTag::identifier("name"));
    registry.register("modelGroup", TextTag::identifier("group"));
    registry.register("modelDescription", TextTag::markdown("description", &["description"]));
    registry.register("modelVersion", VersionTag);

    // Code family
    registry.register("code", Code);
    registry.register("codeName", TextTag::identifier("name"));
    registry.register("codeGroup", TextTag::identifier("group"));
    registry.register("codeDescription", TextTag::markdown("description", &["description"]));
    registry.register("codeVersion", VersionTag);
    registry.register("codeSince", TextTag::plain("since"));
    registry.register("codeParam", CodeParam);
    registry.register("codeReturn", TypedText::returns());
    registry.register("codeThrows", TypedText::throws());
    registry.register("codeSee", See);
    registry.register("codeDeprecated", Deprecated);
    registry.register("codeExample", CodeExample);

    tracing::debug!(tags = registry.len(), "registered built-in tag parsers");
}

#[cfg(test)]
mod tests {
    use crate::registry::Registry;

    /// One representative line of content per built-in tag.
    const SAMPLES: &[(&str, &str)] = &[
        ("api", "{get} /user/:id Read user"),
        ("apiName", "GetUser"),
        ("apiGroup", "User Admin"),
        ("apiDescription", "Reads one user.\n    Deleted users are skipped."),
        ("apiVersion", "1.2.0"),
        ("apiDefine", "UserNotFound Missing user\nReturned when the id is unknown."),
        ("apiUse", "UserNotFound"),
        ("apiStructure", "Address"),
        ("apiSuccessStructure", "UserResponse"),
        ("apiErrorStructure", "ErrorResponse"),
        ("apiHeaderStructure", "AuthHeaders"),
        ("apiPermission", "admin"),
        ("apiSampleRequest", "https://api.example.com/user/:id"),
        ("apiDeprecated", "use (#User:GetUserV2) instead"),
        ("apiPrivate", ""),
        ("apiIgnore", "not finished"),
        ("apiParam", "(Login) {String{1..32}} [name=\"anon\"] Login name."),
        ("apiSuccess", "{Object[]} users List of users."),
        ("apiError", "(Error 5xx) {String} Internal Server failure."),
        ("apiHeader", "{String} Authorization Bearer token."),
        ("apiQuery", "{Number} [page=1] Page number."),
        ("apiBody", "{String} text Note text."),
        ("apiExample", "{curl} Example usage:\n    curl -i http://localhost/user/4711"),
        ("apiParamExample", "{json} Request-Example:\n    { \"id\": 4711 }"),
        ("apiSuccessExample", "{json} Success-Response:\n    HTTP/1.1 200 OK"),
        ("apiErrorExample", "{json} Error-Response:\n    HTTP/1.1 404 Not Found"),
        ("apiHeaderExample", "{json} Header-Example:\n    { \"Accept-Encoding\": \"gzip\" }"),
        ("model", "User Complete user entity"),
        ("modelName", "User"),
        ("modelGroup", "Entities"),
        ("modelDescription", "A registered account."),
        ("modelVersion", "2.0.0"),
        ("code", "{function} slugify"),
        ("codeName", "slugify"),
        ("codeGroup", "Text"),
        ("codeDescription", "Turns text into a URL slug."),
        ("codeVersion", "0.3.0"),
        ("codeSince", "0.1.0"),
        ("codeParam", "{string} [separator=\"-\"] Joins the words."),
        ("codeReturn", "{string} The slug"),
        ("codeThrows", "{TypeError} When text is not a string"),
        ("codeSee", "{@link unslugify}"),
        ("codeDeprecated", "since 0.3.0"),
        ("codeExample", "Basic usage\n  slugify(\"A B\")"),
    ];

    #[test]
    fn every_builtin_has_a_sample() {
        let registry = Registry::with_builtins();
        assert_eq!(SAMPLES.len(), registry.len());
        for (tag, _) in SAMPLES {
            assert!(registry.contains(tag), "{} is not registered", tag);
        }
    }

    #[test]
    fn builtin_parsers_are_pure() {
        let registry = Registry::with_builtins();
        for (tag, content) in SAMPLES {
            let parser = registry.resolve(tag).unwrap();
            let first = parser.parse(content);
            let second = parser.parse(content);
            assert_eq!(first, second, "@{} {:?}", tag, content);
            if let Ok(Some(fragment)) = first {
                assert_eq!(parser.path(&fragment), parser.path(&fragment), "@{}", tag);
            }
        }
    }
}
