use crate::FilterOptions;
use crate::NamespaceOptions;

/// Options with heuristics enabled and namespace tags switched off, so
/// expectations only contain the docstring rendering.
pub fn autobrief_options() -> FilterOptions {
	FilterOptions {
		autobrief: true,
		namespace: NamespaceOptions {
			enabled: false,
			..NamespaceOptions::default()
		},
		..FilterOptions::default()
	}
}

pub fn autocode_options() -> FilterOptions {
	FilterOptions {
		autocode: true,
		..autobrief_options()
	}
}

pub fn verbatim_options() -> FilterOptions {
	FilterOptions {
		autobrief: false,
		..autobrief_options()
	}
}

pub const DOCEXAMPLE: &str = r#"def myfunction(arg1, arg2, kwarg='whatever.'):
    """
    Does nothing more than demonstrate syntax.

    This is an example of how a Pythonic human-readable docstring can
    get parsed and marked up with Doxygen commands.

    Args:
        arg1:   A positional argument.
        arg2:   Another positional argument.

    Kwargs:
        kwarg:  A keyword argument.

    Returns:
        A string holding the result.

    Raises:
        ZeroDivisionError, AssertionError, & ValueError.

    Examples:
        >>> myfunction(2, 3)
        '5 - 0, whatever.'
        >>> myfunction(5, 0, 'oops.')
        Traceback (most recent call last):
            ...
        ZeroDivisionError: integer division or modulo by zero
        >>> myfunction(4, 1, 'got it.')
        '5 - 4, got it.'
        >>> myfunction(23.5, 23, 'oh well.')
        Traceback (most recent call last):
            ...
        AssertionError
    """
    assert isinstance(arg1, int)
    return '{0} - {1}, {2}'.format(arg1 + arg2, arg1 / arg2, kwarg)
"#;

pub fn docexample_rendered() -> Vec<&'static str> {
	vec![
		" @brief Does nothing more than demonstrate syntax.",
		"",
		" This is an example of how a Pythonic human-readable docstring can",
		" get parsed and marked up with Doxygen commands.",
		"",
		" @param arg1 A positional argument.",
		" @param arg2 Another positional argument.",
		"",
		" @param kwarg A keyword argument.",
		"",
		" @return A string holding the result.",
		"",
		" @exception ZeroDivisionError, AssertionError, ValueError",
		"",
		" @par Examples",
		" @code",
		"        >>> myfunction(2, 3)",
		"        '5 - 0, whatever.'",
		"        >>> myfunction(5, 0, 'oops.')",
		"        Traceback (most recent call last):",
		"            ...",
		"        ZeroDivisionError: integer division or modulo by zero",
		"        >>> myfunction(4, 1, 'got it.')",
		"        '5 - 4, got it.'",
		"        >>> myfunction(23.5, 23, 'oh well.')",
		"        Traceback (most recent call last):",
		"            ...",
		"        AssertionError",
		" @endcode",
	]
}

pub const NUMPY_DOCSTRING: &str = "Compute things.

    Parameters
    ----------
    x : int
        The x value.
    y : float
        The y value.

    Returns
    -------
    float
        The result.
    ";

pub const PRIVACY: &str = "class Widget:
    def __secret(self):
        pass

    def _guarded(self):
        pass

    def __init__(self):
        pass
";

pub const INTERFACE: &str = r#"from zope.interface import Interface, Attribute


class IDoor(Interface):
    """A door.

    Args:
        x: not a section here.
    """

    width = Attribute("Width of the door")

    def open():
        """Open the door."""
"#;

pub const IMPLICIT_INTERFACE: &str = r#"class IWindow:
    """A window."""

    implements(IOpenable)
    size = Attribute("Size")

    def close():
        pass


class Window:
    size = Attribute("Size")

    def close(self):
        self.closed = True
"#;

pub const NESTED: &str = r#"class Outer:
    """Outer class."""

    class Inner:
        """Inner class."""

        def method(self):
            """A method."""

            def local():
                """A local helper."""


@staticmethod
def helper():
    """Help."""


async def fetch():
    """Fetch data."""
"#;
