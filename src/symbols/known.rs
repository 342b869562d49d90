// qsapy - A transpiler turning QS script syntax trees into Python source
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Static vocabularies used by the identifier rewriter.
//!
//! `KNOWN_SYMBOLS` mirrors what the `qsa` runtime module exports; keep it in
//! sync with `dir(qsa)` of the runtime in use. Names missing here fall back
//! to the strict/permissive policy.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Names exported by the `qsa` runtime module.
pub const KNOWN_SYMBOLS: &[&str] = &[
    "Application",
    "AQBoolFlagState",
    "AQBoolFlagStateList",
    "AQSButtonGroup",
    "AQFormDB",
    "AQObjectQueryList",
    "AQOdsColor",
    "AQOdsGenerator",
    "AQOdsImage",
    "AQOdsRow",
    "AQOdsSheet",
    "AQOdsSpreadSheet",
    "AQOdsStyle",
    "AQS",
    "AQSettings",
    "AQSignalMapper",
    "AQSSProject",
    "AQSmtpClient",
    "AQSql",
    "AQSqlCursor",
    "AQSqlQuery",
    "AQUnpacker",
    "AQPackager",
    "AQUtil",
    "Any",
    "AnyStr",
    "Array",
    "Boolean",
    "Callable",
    "CheckBox",
    "Color",
    "ComboBox",
    "Date",
    "DateEdit",
    "Dialog",
    "Dict",
    "Dir",
    "FLApplication",
    "FLCheckBox",
    "FLCodBar",
    "FLDataTable",
    "FLDateEdit",
    "FLDomDocument",
    "FLDomElement",
    "FLDomNode",
    "FLDomNodeList",
    "FLDoubleValidator",
    "FLFieldDB",
    "FLFormDB",
    "FLFormRecordDB",
    "FLFormSearchDB",
    "FLIntValidator",
    "FLLineEdit",
    "FLListViewItem",
    "FLNetwork",
    "FLPixmapView",
    "FLPosPrinter",
    "FLReportEngine",
    "FLJasperEngine",
    "FLReportViewer",
    "FLSerialPort",
    "FLSpinBox",
    "FLSqlCursor",
    "FLSqlQuery",
    "FLTable",
    "FLTableDB",
    "FLTextEditOutput",
    "FLTimeEdit",
    "FLUIntValidator",
    "FLUtil",
    "FLVar",
    "FLWidget",
    "FLWorkSpace",
    "Font",
    "File",
    "FileDialog",
    "FormDBWidget",
    "Function",
    "GroupBox",
    "Input",
    "Label",
    "Line",
    "LineEdit",
    "List",
    "LogText",
    "Math",
    "MessageBox",
    "NumberEdit",
    "Number",
    "Object",
    "ObjectNotFoundDGINotLoaded",
    "ObjectNotFoundInCurrentDGI",
    "Optional",
    "Process",
    "Picture",
    "Pixmap",
    "ProxySlot",
    "QAction",
    "QActionGroup",
    "QApplication",
    "QBuffer",
    "QBrush",
    "QButtonGroup",
    "QByteArray",
    "QCheckBox",
    "QColor",
    "QComboBox",
    "QDataView",
    "QDateEdit",
    "QDialog",
    "QDir",
    "QDockWidget",
    "QDomDocument",
    "QEventLoop",
    "QFile",
    "QFileDialog",
    "QFontDialog",
    "QFrame",
    "QGroupBox",
    "QHBoxLayout",
    "QHButtonGroup",
    "QVButtonGroup",
    "QHttp",
    "QHttpResponseHeader",
    "QHttpRequestHeader",
    "QIcon",
    "QIconSet",
    "QImage",
    "QInputDialog",
    "QKeySequence",
    "QLabel",
    "QLayoutWidget",
    "QLineEdit",
    "QListView",
    "QListViewWidget",
    "QListWidgetItem",
    "QMainWindow",
    "QMdiArea",
    "QMdiSubWindow",
    "QMenu",
    "QMessageBox",
    "QObject",
    "QPainter",
    "QPixmap",
    "QPopupMenu",
    "QProcess",
    "QProgressDialog",
    "QPushButton",
    "QRadioButton",
    "QSignalMapper",
    "QSize",
    "QSizePolicy",
    "QSpinBox",
    "QString",
    "QStyleFactory",
    "QSProject",
    "QTabWidget",
    "QTable",
    "QTextEdit",
    "QTimeEdit",
    "QToolBar",
    "QToolBox",
    "QToolButton",
    "QTreeWidget",
    "QTreeWidgetItem",
    "QTreeWidgetItemIterator",
    "QVBoxLayout",
    "QWidget",
    "QtCore",
    "QtWidgets",
    "RadioButton",
    "RegExp",
    "Rect",
    "RichText",
    "SpinBox",
    "String",
    "SysType",
    "System",
    "System_class",
    "Size",
    "TextEdit",
    "TimeEdit",
    "Tuple",
    "TypeVar",
    "aqApp",
    "auth",
    "connect",
    "disconnect",
    "debug",
    "decorators",
    "filedir",
    "form",
    "input",
    "inspect",
    "isNaN",
    "killTimer",
    "killTimers",
    "logger",
    "parseFloat",
    "parseInt",
    "parseString",
    "print_",
    "print_stack",
    "project",
    "proxy_fn",
    "qApp",
    "qsa",
    "qsaRegExp",
    "resolveObject",
    "slot_done",
    "startTimer",
    "sys",
    "types",
    "undefined",
    "ustr",
    "ustr1",
    "util",
];

/// Python keywords and reserved names. Identifiers colliding with these get a `_` suffix.
pub const PYTHON_KEYWORDS: &[&str] = &[
    "and", "del", "for", "is", "raise", "assert", "elif", "from", "lambda", "return", "break",
    "else", "global", "not", "try", "class", "except", "if", "or", "while", "continue", "exec",
    "import", "pass", "yield", "def", "finally", "in", "print", "str", "qsa",
];

/// Known names that are not qualified with `qsa.`.
pub const UNQUALIFIED_KNOWN: &[&str] = &["connect", "disconnect", "form"];

/// Cursor and query methods that a `with` body may call unqualified.
pub const WITH_KEYWORDS: &[&str] = &[
    "Insert",
    "Edit",
    "Del",
    "Browse",
    "select",
    "first",
    "next",
    "prev",
    "last",
    "setValueBuffer",
    "valueBuffer",
    "setTablesList",
    "setSelect",
    "setFrom",
    "setWhere",
    "setForwardOnly",
    "setModeAccess",
    "commitBuffer",
    "commit",
    "refreshBuffer",
    "setNull",
    "setUnLock",
    "child",
];

static KNOWN_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| KNOWN_SYMBOLS.iter().copied().collect());

static KEYWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| PYTHON_KEYWORDS.iter().copied().collect());

/// Lowercase spelling to canonical spelling for known names that contain uppercase letters.
pub(crate) static KNOWN_BY_LOWERCASE: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    KNOWN_SYMBOLS
        .iter()
        .filter(|name| name.to_lowercase() != **name)
        .map(|name| (name.to_lowercase(), *name))
        .collect()
});

/// Whether `name` is exported by the runtime module.
pub fn is_known(name: &str) -> bool {
    KNOWN_SET.contains(name)
}

/// Whether `name` collides with a Python keyword.
pub fn is_python_keyword(name: &str) -> bool {
    KEYWORD_SET.contains(name)
}
