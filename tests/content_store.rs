use mdcms::{
    parse, serialize, Document, Error, FileKind, FsStore, MemoryStore, ReadOutcome, Workspace,
};
use serde_yaml::Mapping;
use tempfile::TempDir;

fn workspace() -> (TempDir, Workspace<FsStore>) {
    let dir = TempDir::new().unwrap();
    let ws = Workspace::new(FsStore::open(dir.path()).unwrap());
    (dir, ws)
}

#[tokio::test]
async fn resolved_paths_stay_inside_the_root() {
    let (_dir, ws) = workspace();
    for p in ["a.md", "pages/a.md", "pages/../a.md", "/pages/./x/y.md", "a\\b.md"] {
        assert!(ws.resolve(p).unwrap().starts_with(ws.root()), "{p}");
    }
    for p in ["..", "../a.md", "pages/../../a.md", "x/y/../../../../etc/passwd"] {
        assert!(matches!(ws.resolve(p), Err(Error::OutOfBounds(_))), "{p}");
    }
}

#[tokio::test]
async fn directory_before_file_at_one_level() {
    let (_dir, ws) = workspace();
    ws.write("b.md", "b").await.unwrap();
    ws.write("a/keep.md", "").await.unwrap();

    let entries = ws.list("", false).await.unwrap();
    let shape: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
    assert_eq!(shape, vec![("a", FileKind::Directory), ("b.md", FileKind::File)]);
}

#[tokio::test]
async fn recursive_listing_puts_children_first() {
    let (_dir, ws) = workspace();
    ws.write("sub/inner.md", "inner").await.unwrap();

    let entries = ws.list("", true).await.unwrap();
    let inner = entries.iter().position(|e| e.path == "sub/inner.md").unwrap();
    let sub = entries.iter().position(|e| e.path == "sub").unwrap();
    assert!(inner < sub);
    assert!(entries.iter().all(|e| !e.path.starts_with("..")));
}

#[tokio::test]
async fn write_read_delete_cycle() {
    let (_dir, ws) = workspace();
    for text in ["", "one line", "multi\nline\n\n  content\n", "ünïcødé ✓\r\n"] {
        ws.write("notes/today.md", text).await.unwrap();
        assert_eq!(ws.read("notes/today.md").await.found().as_deref(), Some(text));
    }

    ws.delete("notes/today.md").await.unwrap();
    assert!(matches!(ws.read("notes/today.md").await, ReadOutcome::NotFound));
    assert!(ws.delete("notes/today.md").await.unwrap_err().is_not_found());
    assert!(ws.list("missing", true).await.unwrap().is_empty());
}

#[test]
fn example_document_round_trip() {
    let text = "---\nid: pari\ntitle: pari\npublished: true\ntags: []\n---\n# pari";
    let doc = parse(text).into_document();
    assert_eq!(doc.id, "pari");
    assert_eq!(doc.title, "pari");
    assert_eq!(doc.slug, "");
    assert!(doc.published);
    assert!(doc.tags.is_empty());
    assert_eq!(doc.body, "# pari");

    let out = serialize(&doc).unwrap();
    assert!(out.ends_with("---\n# pari"));
    let again = parse(&out).into_document();
    assert_eq!(again.id, doc.id);
    assert_eq!(again.title, doc.title);
    assert_eq!(again.published, doc.published);
    assert_eq!(again.body, doc.body);
}

#[test]
fn constructed_documents_survive_serialization() {
    let mut metadata = Mapping::new();
    metadata.insert("subtitle".into(), "Interactive landing".into());
    metadata.insert("order".into(), 2.into());
    let doc = Document {
        id: "pari".into(),
        title: "Pari: a game".into(),
        slug: "pari".into(),
        body: "\n# pari\n\nText.\n".into(),
        published: false,
        tags: vec!["games".into(), "2d".into()],
        author: "Admin".into(),
        featured_image: "https://example.com/a.jpg".into(),
        metadata,
        ..Default::default()
    };

    let back = parse(&serialize(&doc).unwrap()).into_document();
    assert_eq!(back.id, doc.id);
    assert_eq!(back.title, doc.title);
    assert_eq!(back.slug, doc.slug);
    assert_eq!(back.published, doc.published);
    assert_eq!(back.tags, doc.tags);
    assert_eq!(back.author, doc.author);
    assert_eq!(back.featured_image, doc.featured_image);
    assert_eq!(back.body, doc.body);
    assert_eq!(back.meta_str("subtitle").as_deref(), Some("Interactive landing"));
    assert_eq!(back.meta_str("order").as_deref(), Some("2"));
}

#[tokio::test]
async fn exported_snapshot_serves_the_same_content() {
    let (_dir, ws) = workspace();
    ws.write("pages/pari.md", "---\ntitle: pari\n---\n# pari").await.unwrap();
    ws.write("index.md", "home").await.unwrap();

    let snapshot = ws.snapshot().await;
    let frozen = Workspace::new(MemoryStore::new(ws.root(), snapshot));

    assert_eq!(frozen.list("", true).await.unwrap().len(), ws.list("", true).await.unwrap().len());
    assert_eq!(frozen.read("index.md").await.found().as_deref(), Some("home"));
    let pages = frozen.pages("pages", false).await.unwrap();
    assert_eq!(pages[0].document.title, "pari");
    assert!(matches!(frozen.write("index.md", "x").await, Err(Error::ReadOnly)));
}

#[tokio::test]
async fn odd_file_names_survive_export() {
    let (dir, ws) = workspace();
    let root = dir.path();
    std::fs::create_dir(root.join("pages")).unwrap();
    std::fs::write(root.join("pages/100%25 done.md"), "real").unwrap();
    std::fs::write(root.join("pages/%2e%2e%2fsecret.md"), "innocent").unwrap();
    std::fs::write(root.join("secret.md"), "SECRET").unwrap();
    if cfg!(unix) {
        std::fs::write(root.join("a\\b.md"), "backslash").unwrap();
    }

    let snapshot = ws.snapshot().await;
    assert_eq!(snapshot["pages/100%25 done.md"], "real");
    assert_eq!(snapshot["pages/%2e%2e%2fsecret.md"], "innocent");
    assert_eq!(snapshot["secret.md"], "SECRET");
    if cfg!(unix) {
        assert_eq!(snapshot["a\\b.md"], "backslash");
    }

    let frozen = Workspace::new(MemoryStore::new(ws.root(), snapshot.clone()));
    assert_eq!(frozen.snapshot().await, snapshot);
    let shape = |entries: Vec<mdcms::FileEntry>| {
        entries.into_iter().map(|e| (e.path, e.kind)).collect::<Vec<_>>()
    };
    assert_eq!(
        shape(frozen.list("", true).await.unwrap()),
        shape(ws.list("", true).await.unwrap())
    );
}
