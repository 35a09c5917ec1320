//! Source-file import scanning.
//!
//! Reads the package clause and import declarations at the top of each Go
//! source file in a directory. Scanning stops at the first declaration that
//! is not an import, so the rest of the file is never tokenized.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Errors from scanning a directory or one of its files.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no buildable Go source files in {}", dir.display())]
    NoBuildableSource { dir: PathBuf },

    #[error(
        "found packages {first} ({first_file}) and {second} ({second_file}) in {}",
        dir.display()
    )]
    MultiplePackages {
        dir: PathBuf,
        first: String,
        first_file: String,
        second: String,
        second_file: String,
    },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// The imports of one directory.
#[derive(Debug, Default)]
pub struct ScannedPackage {
    pub dir: PathBuf,
    /// Package name, empty when no file could be read
    pub name: String,
    pub imports: BTreeSet<String>,
    /// Files that were skipped, with the reason
    pub file_errors: Vec<ScanError>,
}

/// Scan a directory, failing if its files disagree on the package name.
pub fn scan_dir(dir: &Path) -> Result<ScannedPackage, ScanError> {
    scan(dir, false)
}

/// Scan a directory, skipping files excluded with an `ignore` build
/// constraint and tolerating conflicting package names.
pub fn scan_dir_tolerant(dir: &Path) -> Result<ScannedPackage, ScanError> {
    scan(dir, true)
}

fn scan(dir: &Path, tolerant: bool) -> Result<ScannedPackage, ScanError> {
    let entries = fs::read_dir(dir).map_err(|source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(is_go_source))
        .collect();
    files.sort();

    let mut pkg = ScannedPackage {
        dir: dir.to_path_buf(),
        ..Default::default()
    };
    let mut first_file = String::new();
    let mut buildable = 0usize;

    for path in files {
        let src = match fs::read_to_string(&path) {
            Ok(src) => src,
            Err(source) => {
                pkg.file_errors.push(ScanError::Io { path, source });
                continue;
            }
        };
        let header = match parse_header(&src) {
            Ok(header) => header,
            Err((line, message)) => {
                pkg.file_errors.push(ScanError::Syntax {
                    path,
                    line,
                    message,
                });
                continue;
            }
        };
        if tolerant && header.ignored {
            continue;
        }
        buildable += 1;

        let file_name = file_name_of(&path);
        if pkg.name.is_empty() {
            pkg.name = header.package;
            first_file = file_name;
        } else if pkg.name != header.package && !tolerant {
            return Err(ScanError::MultiplePackages {
                dir: dir.to_path_buf(),
                first: pkg.name,
                first_file,
                second: header.package,
                second_file: file_name,
            });
        }
        pkg.imports.extend(header.imports);
    }

    if buildable == 0 && pkg.file_errors.is_empty() {
        return Err(ScanError::NoBuildableSource {
            dir: dir.to_path_buf(),
        });
    }
    Ok(pkg)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether a file name is a non-test Go source file.
pub fn is_go_source(name: &str) -> bool {
    name.ends_with(".go")
        && !name.ends_with("_test.go")
        && !name.starts_with('_')
        && !name.starts_with('.')
}

/// Whether a directory should be scanned for package sources.
pub fn is_source_dir(name: &str) -> bool {
    !(name.starts_with('_') || name.starts_with('.') || name == "testdata" || name == "vendor")
}

/// All package directories under `base`, including `base` itself.
pub fn source_dirs(base: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(base)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || e.file_name().to_str().is_some_and(is_source_dir)
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir() || (e.depth() == 0 && e.path().is_dir()))
        .map(|e| e.into_path())
}

/// Package clause and imports of one file.
#[derive(Debug, Default, PartialEq, Eq)]
struct FileHeader {
    package: String,
    imports: Vec<String>,
    /// Excluded with an `ignore` build constraint
    ignored: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Punct(char),
    Eof,
}

type ParseResult<T> = Result<T, (usize, String)>;

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    /// Only comments before the package clause carry build constraints
    in_preamble: bool,
    ignored: bool,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            chars: src.chars().peekable(),
            line: 1,
            in_preamble: true,
            ignored: false,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        loop {
            let Some(&c) = self.chars.peek() else {
                return Ok(Token::Eof);
            };
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' => {
                    self.bump();
                    match self.chars.peek() {
                        Some('/') => {
                            self.bump();
                            let text = self.take_line();
                            if self.in_preamble && is_ignore_constraint(&text) {
                                self.ignored = true;
                            }
                        }
                        Some('*') => {
                            self.bump();
                            self.skip_block_comment()?;
                        }
                        _ => return Ok(Token::Punct('/')),
                    }
                }
                '"' => {
                    self.bump();
                    return self.interpreted_string();
                }
                '`' => {
                    self.bump();
                    return self.raw_string();
                }
                c if c == '_' || c.is_alphabetic() => {
                    let mut ident = String::new();
                    while let Some(&c) = self.chars.peek() {
                        if c == '_' || c.is_alphanumeric() {
                            ident.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    return Ok(Token::Ident(ident));
                }
                c => {
                    self.bump();
                    return Ok(Token::Punct(c));
                }
            }
        }
    }

    fn take_line(&mut self) -> String {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump();
        }
        text
    }

    fn skip_block_comment(&mut self) -> ParseResult<()> {
        let start = self.line;
        let mut prev = '\0';
        while let Some(c) = self.bump() {
            if prev == '*' && c == '/' {
                return Ok(());
            }
            prev = c;
        }
        Err((start, "comment not terminated".to_string()))
    }

    fn interpreted_string(&mut self) -> ParseResult<Token> {
        let start = self.line;
        let mut s = String::new();
        while let Some(c) = self.bump() {
            match c {
                '"' => return Ok(Token::Str(s)),
                '\\' => match self.bump() {
                    Some(escaped) => s.push(escaped),
                    None => break,
                },
                '\n' => break,
                c => s.push(c),
            }
        }
        Err((start, "string literal not terminated".to_string()))
    }

    fn raw_string(&mut self) -> ParseResult<Token> {
        let start = self.line;
        let mut s = String::new();
        while let Some(c) = self.bump() {
            if c == '`' {
                return Ok(Token::Str(s));
            }
            s.push(c);
        }
        Err((start, "raw string literal not terminated".to_string()))
    }
}

/// `//go:build ignore` and `// +build ignore` style constraints.
fn is_ignore_constraint(comment: &str) -> bool {
    let expr = if let Some(expr) = comment.strip_prefix("go:build") {
        expr
    } else if let Some(expr) = comment.trim_start().strip_prefix("+build") {
        expr
    } else {
        return false;
    };
    expr.split(|c: char| c.is_whitespace() || c == ',' || c == '(' || c == ')')
        .any(|term| term == "ignore")
}

fn parse_header(src: &str) -> ParseResult<FileHeader> {
    let mut lexer = Lexer::new(src);

    match lexer.next_token()? {
        Token::Ident(kw) if kw == "package" => {}
        _ => return Err((lexer.line, "expected 'package'".to_string())),
    }
    lexer.in_preamble = false;
    let package = match lexer.next_token()? {
        Token::Ident(name) => name,
        _ => return Err((lexer.line, "expected package name".to_string())),
    };

    let mut imports = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::Punct(';') => continue,
            Token::Ident(kw) if kw == "import" => {}
            _ => break,
        }
        match lexer.next_token()? {
            Token::Punct('(') => loop {
                match lexer.next_token()? {
                    Token::Punct(')') => break,
                    Token::Punct(';') => continue,
                    Token::Eof => return Err((lexer.line, "unexpected end of file".to_string())),
                    tok => imports.push(import_spec(&mut lexer, tok)?),
                }
            },
            tok => imports.push(import_spec(&mut lexer, tok)?),
        }
    }

    Ok(FileHeader {
        package,
        imports,
        ignored: lexer.ignored,
    })
}

/// An import spec: `"path"`, `name "path"`, `. "path"` or `_ "path"`.
fn import_spec(lexer: &mut Lexer<'_>, first: Token) -> ParseResult<String> {
    let tok = match first {
        Token::Ident(_) | Token::Punct('.') => lexer.next_token()?,
        tok => tok,
    };
    match tok {
        Token::Str(path) if !path.is_empty() => Ok(path),
        _ => Err((lexer.line, "expected import path".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_header() {
        let src = r#"// Copyright notice
/* block
   comment */
package foo // trailing

import "fmt"
import (
    "os"
    str "strings"
    . "github.com/a/b"
    _ "github.com/c/d/driver" // registers
    `github.com/e/f`
)

func main() {}
import "not/an/import"
"#;
        let header = parse_header(src).unwrap();
        assert_eq!(header.package, "foo");
        assert_eq!(
            header.imports,
            vec![
                "fmt",
                "os",
                "strings",
                "github.com/a/b",
                "github.com/c/d/driver",
                "github.com/e/f"
            ]
        );
        assert!(!header.ignored);
    }

    #[test]
    fn test_parse_header_semicolons() {
        let header = parse_header("package x; import \"a\"; import (\"b\"; \"c\")").unwrap();
        assert_eq!(header.imports, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_build_ignore() {
        let header = parse_header("//go:build ignore\n\npackage main\n").unwrap();
        assert!(header.ignored);
        let header = parse_header("// +build ignore\n\npackage main\n").unwrap();
        assert!(header.ignored);
        let header = parse_header("//go:build linux\n\npackage main\n").unwrap();
        assert!(!header.ignored);
        let header = parse_header("package main\n//go:build ignore\n").unwrap();
        assert!(!header.ignored);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_header("").is_err());
        assert!(parse_header("func main() {}").is_err());
        let (line, _) = parse_header("package a\n\nimport (\n  \"x\n").unwrap_err();
        assert_eq!(line, 4);
        assert!(parse_header("package a\nimport 42\n").is_err());
    }

    #[test]
    fn test_scan_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.go"), "package p\nimport \"fmt\"\n").unwrap();
        fs::write(tmp.path().join("b.go"), "package p\nimport (\"os\"; \"fmt\")\n").unwrap();
        fs::write(tmp.path().join("a_test.go"), "package p\nimport \"testing\"\n").unwrap();
        fs::write(tmp.path().join("_skip.go"), "package q\nimport \"skip\"\n").unwrap();
        fs::write(tmp.path().join("notes.txt"), "import \"nothing\"").unwrap();

        let pkg = scan_dir(tmp.path()).unwrap();
        assert_eq!(pkg.name, "p");
        let imports: Vec<_> = pkg.imports.iter().map(String::as_str).collect();
        assert_eq!(imports, vec!["fmt", "os"]);
        assert!(pkg.file_errors.is_empty());
    }

    #[test]
    fn test_scan_multiple_packages_and_fallback() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("lib.go"), "package lib\nimport \"os\"\n").unwrap();
        fs::write(
            tmp.path().join("gen.go"),
            "// +build ignore\n\npackage main\nimport \"text/template\"\n",
        )
        .unwrap();

        let err = scan_dir(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::MultiplePackages { .. }));

        let pkg = scan_dir_tolerant(tmp.path()).unwrap();
        assert_eq!(pkg.name, "lib");
        assert!(pkg.imports.contains("os"));
        assert!(!pkg.imports.contains("text/template"));
    }

    #[test]
    fn test_scan_no_buildable_source() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("x_test.go"), "package x\n").unwrap();
        let err = scan_dir(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::NoBuildableSource { .. }));
    }

    #[test]
    fn test_scan_bad_file_is_excluded() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("good.go"), "package p\nimport \"os\"\n").unwrap();
        fs::write(tmp.path().join("bad.go"), "this is not go\n").unwrap();

        let pkg = scan_dir(tmp.path()).unwrap();
        assert_eq!(pkg.name, "p");
        assert!(pkg.imports.contains("os"));
        assert_eq!(pkg.file_errors.len(), 1);
        assert!(pkg.file_errors[0].to_string().contains("bad.go:1"));
    }

    #[test]
    fn test_source_dirs() {
        let tmp = TempDir::new().unwrap();
        for dir in ["a/b", "vendor/x", "testdata/y", "_hidden", ".git", "c"] {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }

        let dirs: Vec<_> = source_dirs(tmp.path())
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::new(),
                PathBuf::from("a"),
                PathBuf::from("a/b"),
                PathBuf::from("c")
            ]
        );
    }
}
