use quote::{format_ident, quote};

/// Generates one `#[test]` per `.lox` file below `bin/tests/suite`, each
/// calling `lox_expect` with the file's contents.
#[proc_macro]
pub fn generate_tests(_: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let suite_dir = format!("{}/../suite", env!("CARGO_MANIFEST_DIR"));
    let mut fixtures = walkdir::WalkDir::new(&suite_dir)
        .into_iter()
        .flatten()
        .filter(|entry| entry.path().extension() == Some("lox".as_ref()))
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();
    fixtures.sort();

    let tests = fixtures.iter().map(|path| {
        let test_file_path = path.to_string_lossy();
        let relative_test_path = path.strip_prefix(&suite_dir).unwrap().to_string_lossy();
        let test_ident = format_ident!(
            "test_{}",
            relative_test_path.replace(['/', '\\'], "_").replace(".lox", "")
        );
        quote! {
            #[test]
            fn #test_ident() {
                lox_expect(std::fs::read_to_string(#test_file_path).unwrap().as_str());
            }
        }
    });

    quote! {
        #[ctor::ctor]
        fn init() {
            let _ = env_logger::builder().is_test(true).try_init();
        }

        #(#tests)*
    }
    .into()
}
