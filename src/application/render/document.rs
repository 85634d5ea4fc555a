//! LaTeX document assembly for TikZ pictures.

/// Libraries loaded for every picture, after any caller-supplied ones.
pub const DEFAULT_LIBRARIES: &[&str] = &[
    "arrows",
    "snakes",
    "backgrounds",
    "patterns",
    "matrix",
    "shapes",
    "fit",
    "calc",
    "shadows",
    "plotmarks",
];

const PREAMBLE_HEAD: &str = r"
\documentclass{article}

\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}

\usepackage{amsmath}
\usepackage{amsfonts}
\usepackage{amssymb}

";

const PREAMBLE_TIKZ: &str = r"

\usepackage{tikz}

";

const PREAMBLE_TAIL: &str = r"

\usepackage[graphics,tightpage,active]{preview}

\PreviewEnvironment{tikzpicture}
\PreviewEnvironment{equation}
\PreviewEnvironment{equation*}

\newlength{\imagewidth}
\newlength{\imagescale}

\pagestyle{empty}
\thispagestyle{empty}

\begin{document}
";

const DOCUMENT_END: &str = r"
\end{document}";

/// Wrap `code` in a `tikzpicture` environment with the given option tokens.
pub fn tikz_picture(code: &str, options: &[String]) -> String {
    format!(
        "\n\\begin{{tikzpicture}}[{}]\n{code}\n\\end{{tikzpicture}}\n",
        options.join(" ")
    )
}

/// Caller libraries in order, then the defaults, each library at most once.
pub fn library_set(libraries: &[String]) -> Vec<&str> {
    let mut set: Vec<&str> = Vec::with_capacity(libraries.len() + DEFAULT_LIBRARIES.len());
    for library in libraries
        .iter()
        .map(String::as_str)
        .chain(DEFAULT_LIBRARIES.iter().copied())
    {
        if !set.contains(&library) {
            set.push(library);
        }
    }
    set
}

/// Build the complete LaTeX document compiled for a TikZ cell.
///
/// Package and library names are not validated; a bad name surfaces as a
/// LaTeX failure.
pub fn assemble(
    code: &str,
    options: &[String],
    packages: &[String],
    libraries: &[String],
) -> String {
    let packages = packages
        .iter()
        .map(|package| format!("\\usepackage{{{package}}}"))
        .collect::<Vec<_>>()
        .join("\n");
    let libraries = library_set(libraries)
        .into_iter()
        .map(|library| format!("\\usetikzlibrary{{{library}}}"))
        .collect::<Vec<_>>()
        .join("\n");
    let picture = tikz_picture(code, options);

    let mut document = String::with_capacity(
        PREAMBLE_HEAD.len()
            + packages.len()
            + PREAMBLE_TIKZ.len()
            + libraries.len()
            + PREAMBLE_TAIL.len()
            + picture.len()
            + DOCUMENT_END.len(),
    );
    document.push_str(PREAMBLE_HEAD);
    document.push_str(&packages);
    document.push_str(PREAMBLE_TIKZ);
    document.push_str(&libraries);
    document.push_str(PREAMBLE_TAIL);
    document.push_str(&picture);
    document.push_str(DOCUMENT_END);
    document
}
